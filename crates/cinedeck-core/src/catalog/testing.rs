//! In-process catalog mock shared by the catalog tests.
#![allow(clippy::arithmetic_side_effects, clippy::as_conversions)]

use std::cell::RefCell;
use std::collections::HashSet;

use cinedeck_api::tmdb::{ApiError, Category, LocalCatalogApi, Movie, MovieDetails, MoviePage};

/// Builds a page of `per_page` movies with ids unique per category and page.
pub fn make_page(category: Category, page: u32, per_page: usize, total_pages: u32) -> MoviePage {
    let lane = Category::ALL
        .iter()
        .position(|c| *c == category)
        .unwrap_or_default() as u64;
    let results = (0..per_page)
        .map(|i| {
            let id = lane * 1_000_000 + u64::from(page) * 1000 + i as u64;
            Movie {
                id,
                title: format!("{} {page}-{i}", category.slug()),
                original_title: Some(format!("Original {id}")),
                overview: None,
                poster_path: None,
                backdrop_path: None,
                vote_average: 7.5,
                release_date: None,
                genre_ids: vec![18],
                genres: Vec::new(),
                runtime: None,
            }
        })
        .collect();
    MoviePage {
        page,
        results,
        total_pages,
        total_results: total_pages * per_page as u32,
    }
}

fn rejected() -> ApiError {
    ApiError::Status {
        status: 500,
        code: 0,
        message: String::from("mock failure"),
    }
}

/// Serves deterministic pages and records every request.
pub struct MockCatalog {
    per_page: usize,
    total_pages: u32,
    requests: RefCell<Vec<(Category, String, u32)>>,
    details_requests: RefCell<Vec<(u64, String)>>,
    failing: RefCell<HashSet<(Category, u32)>>,
}

impl MockCatalog {
    pub fn new(per_page: usize, total_pages: u32) -> Self {
        Self {
            per_page,
            total_pages,
            requests: RefCell::new(Vec::new()),
            details_requests: RefCell::new(Vec::new()),
            failing: RefCell::new(HashSet::new()),
        }
    }

    /// Makes every later request for this category page fail.
    pub fn fail_page(&self, category: Category, page: u32) {
        self.failing.borrow_mut().insert((category, page));
    }

    pub fn requests(&self) -> Vec<(Category, String, u32)> {
        self.requests.borrow().clone()
    }

    pub fn details_requests(&self) -> Vec<(u64, String)> {
        self.details_requests.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl LocalCatalogApi for MockCatalog {
    async fn movie_list(
        &self,
        category: Category,
        language: &str,
        page: u32,
    ) -> Result<MoviePage, ApiError> {
        self.requests
            .borrow_mut()
            .push((category, language.to_owned(), page));
        if self.failing.borrow().contains(&(category, page)) {
            return Err(rejected());
        }
        Ok(make_page(category, page, self.per_page, self.total_pages))
    }

    async fn movie_details(
        &self,
        movie_id: u64,
        language: &str,
    ) -> Result<MovieDetails, ApiError> {
        self.details_requests
            .borrow_mut()
            .push((movie_id, language.to_owned()));
        if movie_id == 0 {
            return Err(ApiError::Status {
                status: 404,
                code: 34,
                message: String::from("The resource you requested could not be found."),
            });
        }
        let body = serde_json::json!({
            "id": movie_id,
            "title": format!("Movie {movie_id}"),
            "original_title": format!("Original {movie_id}"),
            "runtime": 120,
            "genres": [{"id": 18, "name": "Drama"}],
        });
        serde_json::from_value(body).map_err(|source| ApiError::Decode {
            path: format!("movie/{movie_id}"),
            source,
        })
    }
}
