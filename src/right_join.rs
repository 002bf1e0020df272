/// Two-pointer merge of a decoder run against an aligner block
///
/// Walks `i` over the `n` decoder steps and `j` over the `m` aligner steps.
/// While both sides have steps left, a true `checkpoint(i, j)` means aligner
/// column `j` is an insertion the decoder has no step for, so only `j`
/// advances; otherwise both advance together. Whatever remains on either side
/// is drained afterwards, decoder side first.

/// Membership masks of the merged order
///
/// `left[k]` is true when merged position `k` consumes a decoder step,
/// `right[k]` when it consumes an aligner step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RightJoin {
    left: Vec<bool>,
    right: Vec<bool>,
}

impl RightJoin {
    /// `checkpoint` is only ever called with `i < n` and `j < m`
    pub fn new<F>(n: usize, m: usize, mut checkpoint: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut left = Vec::with_capacity(n + m);
        let mut right = Vec::with_capacity(n + m);
        let (mut i, mut j) = (0, 0);

        while i < n && j < m {
            if checkpoint(i, j) {
                left.push(false);
                right.push(true);
                j += 1;
            } else {
                left.push(true);
                right.push(true);
                i += 1;
                j += 1;
            }
        }

        while i < n {
            left.push(true);
            right.push(false);
            i += 1;
        }

        while j < m {
            left.push(false);
            right.push(true);
            j += 1;
        }

        RightJoin { left, right }
    }

    pub fn left(&self) -> &[bool] {
        &self.left
    }

    pub fn right(&self) -> &[bool] {
        &self.right
    }

    /// Number of merged positions
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Pair up both sides in merged order
    ///
    /// Each output position pulls the next item from `left` and/or `right`
    /// according to the masks, yielding `None` for the side it skips. The
    /// iterators must hold at least as many items as the masks consume.
    pub fn zip<'a, L, R>(
        &'a self,
        left: L,
        right: R,
    ) -> impl Iterator<Item = (Option<L::Item>, Option<R::Item>)> + 'a
    where
        L: Iterator + 'a,
        R: Iterator + 'a,
    {
        let lhs = expand(self.left.iter().copied(), left);
        let rhs = expand(self.right.iter().copied(), right);
        lhs.zip(rhs)
    }
}

/// Pull the next item wherever the mask is true, `None` elsewhere
pub fn expand<M, I>(mask: M, mut items: I) -> impl Iterator<Item = Option<I::Item>>
where
    M: IntoIterator<Item = bool>,
    I: Iterator,
{
    mask.into_iter()
        .map(move |take| if take { items.next() } else { None })
}
