use crate::model::ClusterId;

/// Hands out fresh cluster ids past the highest id used by real clusters.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Seed after `max` (the highest assigned cluster id), or at 0 when no
    /// cluster exists.
    pub fn after(max: Option<ClusterId>) -> Self {
        Self {
            next: max.map_or(0, |id| id.0 + 1),
        }
    }

    pub fn next_id(&mut self) -> ClusterId {
        let id = ClusterId(self.next);
        self.next += 1;
        id
    }
}

impl Iterator for IdAllocator {
    type Item = ClusterId;

    fn next(&mut self) -> Option<ClusterId> {
        Some(self.next_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_after_max() {
        let mut alloc = IdAllocator::after(Some(ClusterId(4)));
        assert_eq!(alloc.next_id(), ClusterId(5));
        assert_eq!(alloc.next_id(), ClusterId(6));
    }

    #[test]
    fn starts_at_zero_without_clusters() {
        let ids: Vec<_> = IdAllocator::after(None).take(3).collect();
        assert_eq!(ids, vec![ClusterId(0), ClusterId(1), ClusterId(2)]);
    }
}
