use crate::pack::{pack_row, verify_pack};
use crate::packing::{Argb32, Argb64, Layout, Rgb30};
use crate::planes::{read_planes, read_planes_mut};
use crate::unpack::{unpack_row, verify_unpack};
use crate::{ConvertError, ImageMut, ImageRef, Packing, pack, unpack};
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;

/// Same as [`pack`] but spreads rows over the rayon thread pool
#[inline(never)]
pub fn pack_multi_thread(
    src: &dyn ImageRef,
    dst: &mut dyn ImageMut,
    packing: Packing,
) -> Result<(), ConvertError> {
    if num_cpus::get() == 1 {
        return pack(src, dst, packing);
    }

    verify_pack(src, dst, packing)?;

    let width = src.width();
    let height = src.height();

    let src_planes = read_planes::<3>(src.planes())?;
    let [dst_plane] = read_planes_mut::<1>(dst.planes_mut())?;

    match packing {
        Packing::Argb32 => par_pack_rows::<Argb32>(src_planes, dst_plane, width, height),
        Packing::Rgb30 => par_pack_rows::<Rgb30>(src_planes, dst_plane, width, height),
        Packing::Argb64 => par_pack_rows::<Argb64>(src_planes, dst_plane, width, height),
    }

    Ok(())
}

/// Same as [`unpack`] but spreads rows over the rayon thread pool
#[inline(never)]
pub fn unpack_multi_thread(
    src: &dyn ImageRef,
    dst: &mut dyn ImageMut,
    packing: Packing,
) -> Result<(), ConvertError> {
    if num_cpus::get() == 1 {
        return unpack(src, dst, packing);
    }

    verify_unpack(src, dst, packing)?;

    let width = dst.width();
    let height = dst.height();

    let [src_plane] = read_planes::<1>(src.planes())?;
    let dst_planes = read_planes_mut::<3>(dst.planes_mut())?;

    match packing {
        Packing::Argb32 => par_unpack_rows::<Argb32>(src_plane, dst_planes, width, height),
        Packing::Rgb30 => par_unpack_rows::<Rgb30>(src_plane, dst_planes, width, height),
        Packing::Argb64 => par_unpack_rows::<Argb64>(src_plane, dst_planes, width, height),
    }

    Ok(())
}

fn par_pack_rows<L: Layout>(
    src: [(&[u8], usize); 3],
    (dst, dst_stride): (&mut [u8], usize),
    width: usize,
    height: usize,
) {
    dst.par_chunks_exact_mut(dst_stride)
        .take(height)
        .enumerate()
        .for_each(|(y, dst_row)| pack_row::<L>(&src, y, width, dst_row));
}

fn par_unpack_rows<L: Layout>(
    src: (&[u8], usize),
    dst: [(&mut [u8], usize); 3],
    width: usize,
    height: usize,
) {
    let [(r, r_stride), (g, g_stride), (b, b_stride)] = dst;

    r.par_chunks_exact_mut(r_stride)
        .zip(g.par_chunks_exact_mut(g_stride))
        .zip(b.par_chunks_exact_mut(b_stride))
        .take(height)
        .enumerate()
        .for_each(|(y, ((r, g), b))| unpack_row::<L>(src, y, width, [r, g, b]));
}
