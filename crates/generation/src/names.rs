use std::collections::HashSet;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Random numeric filenames, never repeating a reserved or previously issued name.
///
/// Shared by concurrent generation tasks behind a single mutex.
#[derive(Debug)]
pub struct UniqueFilenames<R = StdRng> {
    rng: R,
    reserved: HashSet<String>,
}

impl UniqueFilenames<StdRng> {
    pub fn new(reserved: impl IntoIterator<Item = String>) -> Self {
        Self::with_rng(StdRng::from_entropy(), reserved)
    }
}

impl<R: Rng> UniqueFilenames<R> {
    pub fn with_rng(rng: R, reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            rng,
            reserved: reserved.into_iter().collect(),
        }
    }

    pub fn reserve(&mut self, filename: impl Into<String>) {
        self.reserved.insert(filename.into());
    }

    pub fn is_reserved(&self, filename: &str) -> bool {
        self.reserved.contains(filename)
    }

    pub fn generate(&mut self, extension: &str) -> String {
        loop {
            let candidate = format!("{}.{extension}", self.rng.gen::<u32>());
            if self.reserved.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::rngs::mock::StepRng;
    use tokio::sync::Mutex;

    use super::*;

    #[test]
    fn skips_reserved_names() {
        let mut names = UniqueFilenames::with_rng(StepRng::new(1, 1), ["1.json".to_string()]);
        assert_eq!(names.generate("json"), "2.json");
        assert!(names.is_reserved("2.json"));
    }

    #[test]
    fn issued_names_become_reserved() {
        let mut names = UniqueFilenames::with_rng(StepRng::new(1, 1), Vec::new());
        let first = names.generate("js");
        assert_eq!(first, "1.js");
        assert!(names.is_reserved(&first));
        names.reserve("2.json");
        assert_eq!(names.generate("json"), "3.json");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_receive_distinct_names() {
        let names = Arc::new(Mutex::new(UniqueFilenames::new(Vec::new())));
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..64 {
            let names = Arc::clone(&names);
            tasks.spawn(async move { names.lock().await.generate("json") });
        }

        let mut issued = HashSet::new();
        while let Some(name) = tasks.join_next().await {
            assert!(issued.insert(name.expect("task")));
        }
        assert_eq!(issued.len(), 64);
    }
}
