//! Record builders shared by the unit tests.

use data_loader::{Minutes, MovieRecord, Year};

pub(crate) struct MovieBuilder(MovieRecord);

/// A feature film with the given rating and nothing else set
pub(crate) fn movie(title: &str, rating: f64) -> MovieBuilder {
    MovieBuilder(MovieRecord {
        id: format!("tt-{title}"),
        title_type: "movie".to_string(),
        primary_title: title.to_string(),
        original_title: title.to_string(),
        is_adult: false,
        start_year: None,
        end_year: None,
        runtime_minutes: None,
        genres: Vec::new(),
        average_rating: rating,
        num_votes: None,
    })
}

impl MovieBuilder {
    pub(crate) fn genres(mut self, genres: &[&str]) -> Self {
        self.0.genres = genres.iter().map(|g| g.to_string()).collect();
        self
    }

    pub(crate) fn year(mut self, year: Year) -> Self {
        self.0.start_year = Some(year);
        self
    }

    pub(crate) fn runtime(mut self, minutes: Minutes) -> Self {
        self.0.runtime_minutes = Some(minutes);
        self
    }

    pub(crate) fn votes(mut self, votes: u64) -> Self {
        self.0.num_votes = Some(votes);
        self
    }

    pub(crate) fn title_type(mut self, title_type: &str) -> Self {
        self.0.title_type = title_type.to_string();
        self
    }

    pub(crate) fn build(self) -> MovieRecord {
        self.0
    }
}
