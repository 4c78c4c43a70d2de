use crate::notify::Toast;

/// Single sink for user-visible notifications.
pub trait NotifierPort: Send + Sync {
    fn notify(&self, toast: Toast);
}
