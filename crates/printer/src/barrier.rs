use crate::log::PrintLog;
use bus::ResourceKey;
use std::collections::HashSet;

/// What one `mark_loaded` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    /// Recorded; more resources outstanding.
    Pending,
    /// Recorded, and it was the last one. Returned exactly once per barrier.
    Released,
    /// This resource had already reported.
    Duplicate,
    /// Recorded after release (more calls than the count made at clone time).
    Late,
}

/// Completion gate over a resource count fixed before any loading starts.
///
/// Loaded and errored resources both count toward completion. Created fresh for every
/// invocation so that overlapping print cycles never share counters.
#[derive(Debug)]
pub struct Barrier {
    total: usize,
    loaded: HashSet<ResourceKey>,
    errored: HashSet<ResourceKey>,
    released: bool,
    log: PrintLog,
}

impl Barrier {
    pub fn new(total: usize, log: PrintLog) -> Self {
        Self {
            total,
            loaded: HashSet::new(),
            errored: HashSet::new(),
            released: false,
            log,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn resolved(&self) -> usize {
        self.loaded.len() + self.errored.len()
    }

    pub fn errored(&self) -> usize {
        self.errored.len()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Release immediately when there is nothing to wait for. True at most once.
    pub fn release_if_empty(&mut self) -> bool {
        if self.total == 0 && !self.released {
            self.released = true;
            return true;
        }
        false
    }

    pub fn mark_loaded(&mut self, resource: ResourceKey, error: Option<&str>) -> Mark {
        // some engines fire both onload and onerror, or fire onload repeatedly
        if self.loaded.contains(&resource) || self.errored.contains(&resource) {
            self.log.debug(format_args!(
                "tried to mark a resource that has already been handled: {resource:?}"
            ));
            return Mark::Duplicate;
        }

        match error {
            None => {
                self.loaded.insert(resource);
            }
            Some(error) => {
                self.log.warn(format_args!(
                    "unable to load a resource but will continue attempting to print the page: {error}"
                ));
                self.errored.insert(resource);
            }
        }

        if self.released {
            return Mark::Late;
        }
        if self.resolved() >= self.total {
            self.released = true;
            return Mark::Released;
        }
        Mark::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::Id;

    fn barrier(total: usize) -> Barrier {
        Barrier::new(total, PrintLog::new(true))
    }

    #[test]
    fn releases_once_after_exact_count_in_any_order() {
        let keys = [
            ResourceKey::Element(Id(3)),
            ResourceKey::Font(0),
            ResourceKey::SourceElement(Id(9)),
            ResourceKey::Element(Id(1)),
        ];
        let mut b = barrier(keys.len());

        let mut released = 0;
        for (i, key) in keys.iter().rev().enumerate() {
            let error = (i % 2 == 0).then_some("404");
            if b.mark_loaded(*key, error) == Mark::Released {
                released += 1;
                assert_eq!(i, keys.len() - 1);
            }
        }
        assert_eq!(released, 1);
        assert_eq!(b.resolved(), 4);
        assert_eq!(b.errored(), 2);
    }

    #[test]
    fn duplicate_marks_count_once() {
        let mut b = barrier(2);
        let key = ResourceKey::Element(Id(5));
        assert_eq!(b.mark_loaded(key, None), Mark::Pending);
        assert_eq!(b.mark_loaded(key, None), Mark::Duplicate);
        assert_eq!(b.mark_loaded(key, Some("late error")), Mark::Duplicate);
        assert_eq!(b.resolved(), 1);
        assert!(!b.is_released());
    }

    #[test]
    fn empty_barrier_releases_without_marks() {
        let mut b = barrier(0);
        assert!(b.release_if_empty());
        assert!(!b.release_if_empty());
        assert!(b.is_released());
    }

    #[test]
    fn marks_after_release_do_not_release_again() {
        let mut b = barrier(1);
        assert_eq!(b.mark_loaded(ResourceKey::Font(0), None), Mark::Released);
        assert_eq!(b.mark_loaded(ResourceKey::Font(1), None), Mark::Late);
        assert!(!b.release_if_empty());
    }
}
