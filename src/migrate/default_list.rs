//! The fallback list for items whose area has no list.

use crate::google::{TaskList, TaskService};
use tracing::{info, warn};

/// Lazily resolved fallback list.
///
/// The list is looked up by title on first need and created if missing.
/// Once resolved it is cached; a failed creation is not, so the next item
/// that needs the list tries again.
#[derive(Debug)]
pub struct DefaultList {
    title: String,
    cached: Option<TaskList>,
}

/// Whether [`DefaultList::get_or_create`] found or created the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Cached,
    Reused,
    Created,
}

impl DefaultList {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cached: None,
        }
    }

    pub fn cached(&self) -> Option<&TaskList> {
        self.cached.as_ref()
    }

    /// Return the fallback list, finding or creating it on first call.
    pub fn get_or_create<S: TaskService + ?Sized>(
        &mut self,
        service: &mut S,
    ) -> Option<(TaskList, Resolution)> {
        if let Some(list) = &self.cached {
            return Some((list.clone(), Resolution::Cached));
        }

        let found = match service.find_list_by_title(&self.title) {
            Ok(found) => found,
            Err(e) => {
                warn!(title = %self.title, error = %e, "Default list lookup failed, creating it");
                None
            }
        };

        let (list, resolution) = match found {
            Some(list) => {
                info!(list_id = %list.id, title = %list.title, "Using existing default list");
                (list, Resolution::Reused)
            }
            None => match service.create_list(&self.title) {
                Ok(list) => {
                    info!(list_id = %list.id, title = %list.title, "Created default list");
                    (list, Resolution::Created)
                }
                Err(e) => {
                    warn!(title = %self.title, error = %e, "Failed to create default list");
                    return None;
                }
            },
        };

        self.cached = Some(list.clone());
        Some((list, resolution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::InMemoryTaskService;

    #[test]
    fn test_created_once_then_cached() {
        let mut service = InMemoryTaskService::new();
        let mut default = DefaultList::new("Inbox");

        let (first, how) = default.get_or_create(&mut service).unwrap();
        assert_eq!(how, Resolution::Created);
        let (second, how) = default.get_or_create(&mut service).unwrap();
        assert_eq!(how, Resolution::Cached);
        assert_eq!(first, second);
        assert_eq!(service.create_list_calls(), 1);
    }

    #[test]
    fn test_reuses_existing_list() {
        let mut service = InMemoryTaskService::new().with_list("Inbox");
        let mut default = DefaultList::new("Inbox");
        let (list, how) = default.get_or_create(&mut service).unwrap();
        assert_eq!(how, Resolution::Reused);
        assert_eq!(list.id, "list-1");
        assert_eq!(service.create_list_calls(), 0);
    }

    #[test]
    fn test_failed_creation_is_not_cached() {
        let mut service = InMemoryTaskService::new().fail_list_creation("Inbox");
        let mut default = DefaultList::new("Inbox");
        assert!(default.get_or_create(&mut service).is_none());
        assert!(default.get_or_create(&mut service).is_none());
        assert!(default.cached().is_none());
        assert_eq!(service.create_list_calls(), 2);
    }
}
