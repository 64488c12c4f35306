/// Tri-state query envelope (plus `Idle` before anything was requested).
///
/// A query moves `Idle -> Loading -> Success | Error`. Reloading the same
/// logical stream moves it back to `Loading`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T, E> {
    Idle,
    Loading,
    Success(T),
    Error(E),
}

impl<T, E> Default for Resource<T, E> {
    fn default() -> Self {
        Resource::Idle
    }
}

impl<T, E> Resource<T, E> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Resource::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Resource::Error(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Resource::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Resource::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Resource<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Resource::Idle => Resource::Idle,
            Resource::Loading => Resource::Loading,
            Resource::Success(value) => Resource::Success(f(value)),
            Resource::Error(err) => Resource::Error(err),
        }
    }
}

impl<T, E> From<Result<T, E>> for Resource<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Resource::Success(value),
            Err(err) => Resource::Error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state: Resource<Vec<u8>, String> = Resource::default();
        assert!(state.is_idle());
        assert_eq!(state.success(), None);
    }

    #[test]
    fn test_map_keeps_non_success_states() {
        let loading: Resource<u8, String> = Resource::Loading;
        assert!(loading.map(|v| v + 1).is_loading());

        let failed: Resource<u8, String> = Resource::Error("boom".to_string());
        assert_eq!(failed.map(|v| v + 1).error(), Some(&"boom".to_string()));

        let ok: Resource<u8, String> = Resource::Success(1);
        assert_eq!(ok.map(|v| v + 1), Resource::Success(2));
    }

    #[test]
    fn test_from_result() {
        let ok: Resource<u8, &str> = Ok(3).into();
        assert_eq!(ok, Resource::Success(3));
        let err: Resource<u8, &str> = Err("nope").into();
        assert!(err.is_error());
    }
}
