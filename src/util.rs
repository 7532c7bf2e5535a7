/// Arithmetic that panics on overflow regardless of build profile
pub(crate) trait StrictApi: Sized {
    fn strict_add_(self, rhs: Self) -> Self;
    fn strict_mul_(self, rhs: Self) -> Self;
}

impl StrictApi for usize {
    #[inline(always)]
    #[track_caller]
    fn strict_add_(self, rhs: Self) -> Self {
        match self.checked_add(rhs) {
            Some(v) => v,
            None => panic!("attempt to add with overflow"),
        }
    }

    #[inline(always)]
    #[track_caller]
    fn strict_mul_(self, rhs: Self) -> Self {
        match self.checked_mul(rhs) {
            Some(v) => v,
            None => panic!("attempt to multiply with overflow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StrictApi;

    #[test]
    fn strict_ops() {
        assert_eq!(3usize.strict_add_(4), 7);
        assert_eq!(3usize.strict_mul_(4), 12);
    }

    #[test]
    #[should_panic(expected = "multiply with overflow")]
    fn strict_mul_overflow() {
        let _ = usize::MAX.strict_mul_(2);
    }
}
