/// Direction of a ranking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Anything that can be ranked by a scalar key at an index.
pub trait Rankable {
    fn key(&self, idx: usize) -> f64;
    fn swap_items(&mut self, a: usize, b: usize);
}

impl Rankable for [f64] {
    fn key(&self, idx: usize) -> f64 {
        self[idx]
    }

    fn swap_items(&mut self, a: usize, b: usize) {
        self.swap(a, b);
    }
}

#[inline(always)]
fn keeps_left(order: SortOrder, value: f64, pivot: f64) -> bool {
    match order {
        SortOrder::Ascending => value <= pivot,
        SortOrder::Descending => value >= pivot,
    }
}

#[inline(always)]
fn moves_left(order: SortOrder, value: f64, pivot: f64) -> bool {
    match order {
        SortOrder::Ascending => value > pivot,
        SortOrder::Descending => value < pivot,
    }
}

/// Hoare partition of `[lo, hi]` around the key at `lo`. Returns the final
/// pivot slot.
fn partition<R: Rankable + ?Sized>(items: &mut R, lo: usize, hi: usize, order: SortOrder) -> usize {
    let pivot = items.key(lo);
    let mut i = lo;
    let mut j = hi + 1;

    loop {
        loop {
            i += 1;
            if i > hi || !keeps_left(order, items.key(i), pivot) {
                break;
            }
        }

        loop {
            j -= 1;
            if !moves_left(order, items.key(j), pivot) {
                break;
            }
        }

        if i >= j {
            break;
        }
        items.swap_items(i, j);
    }

    items.swap_items(lo, j);
    j
}

/// Sorts the inclusive range `[lo, hi]` in place. Not stable: equal keys may
/// come out in any order.
pub fn quicksort<R: Rankable + ?Sized>(items: &mut R, lo: usize, hi: usize, order: SortOrder) {
    let mut stack = vec![(lo, hi)];

    while let Some((l, r)) = stack.pop() {
        if l >= r {
            continue;
        }
        let p = partition(items, l, r, order);
        if p > l {
            stack.push((l, p - 1));
        }
        stack.push((p + 1, r));
    }
}
