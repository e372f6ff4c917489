/// Drops a value equal to the last one that passed.
#[derive(Debug, Clone)]
pub struct DistinctUntilChanged<T> {
    last: Option<T>,
}

impl<T> Default for DistinctUntilChanged<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: PartialEq + Clone> DistinctUntilChanged<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, value: T) -> Option<T> {
        if self.last.as_ref() == Some(&value) {
            return None;
        }
        self.last = Some(value.clone());
        Some(value)
    }

    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::DistinctUntilChanged;

    #[test]
    fn suppresses_consecutive_duplicates_only() {
        let mut stage = DistinctUntilChanged::new();
        let passed = ["a", "a", "b", "b", "a"]
            .into_iter()
            .filter_map(|value| stage.accept(value))
            .collect::<Vec<_>>();
        assert_eq!(passed, vec!["a", "b", "a"]);
        assert_eq!(stage.last(), Some(&"a"));
    }

    #[test]
    fn reset_forgets_last_value() {
        let mut stage = DistinctUntilChanged::new();
        assert_eq!(stage.accept(3), Some(3));
        stage.reset();
        assert_eq!(stage.accept(3), Some(3));
    }
}
