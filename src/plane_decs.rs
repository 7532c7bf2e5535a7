use crate::StrictApi as _;

/// Description for a Plane which can be used to implement bounds checks, stride calculation and buffer sizes.
///
/// Not used by the pack/unpack kernels themselves, only utility functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlaneDesc {
    pub(crate) width_op: Op,
    pub(crate) height_op: Op,

    /// 1 for 8 bit, 2 for 9-16 bit, 4 for 17-32 bit samples
    pub(crate) bytes_per_sample: usize,
}

impl PlaneDesc {
    pub(crate) const fn full(bytes_per_sample: usize) -> Self {
        Self {
            width_op: Op::Identity,
            height_op: Op::Identity,
            bytes_per_sample,
        }
    }

    pub(crate) const fn sub_sampled(bytes_per_sample: usize, shift_w: u8, shift_h: u8) -> Self {
        Self {
            width_op: Op::from_shift(shift_w),
            height_op: Op::from_shift(shift_h),
            bytes_per_sample,
        }
    }

    pub(crate) fn packed_stride(&self, width: usize) -> usize {
        self.width_op.op(width).strict_mul_(self.bytes_per_sample)
    }
}

/// Plane's number of samples in relation to width / height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Shr(u8),
    Identity,
}

impl Op {
    const fn from_shift(shift: u8) -> Self {
        if shift == 0 { Op::Identity } else { Op::Shr(shift) }
    }

    pub(crate) fn op(self, lhs: usize) -> usize {
        match self {
            Op::Shr(rhs) => lhs >> rhs,
            Op::Identity => lhs,
        }
    }
}
