use std::sync::{Arc, Mutex};

use news_pulse::search::{NewsSearch, SearchResult};

#[derive(Clone, Default)]
pub struct MockNewsSearch {
    results: Vec<SearchResult>,
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl MockNewsSearch {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn single(title: &str, description: &str) -> Self {
        Self::with_results(vec![SearchResult {
            title: title.to_string(),
            description: description.to_string(),
            url: "https://example.com/story".to_string(),
            published: Some("2 days ago".to_string()),
        }])
    }
}

impl NewsSearch for MockNewsSearch {
    const MAX_RESULTS: usize = 20;

    async fn search(&self, query: &str, _count: usize) -> Vec<SearchResult> {
        self.queries.lock().unwrap().push(query.to_string());
        self.results.clone()
    }
}
