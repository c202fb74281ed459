//! Filtering and ordering of the project list.

use crate::model::{Project, ProjectStatus};

/// Which statuses a listing shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StatusFilter {
  #[default]
  All,
  /// In progress or on hold
  Active,
  Finished,
}

impl StatusFilter {
  pub fn matches(self, status: ProjectStatus) -> bool {
    match self {
      StatusFilter::All => true,
      StatusFilter::Active => status.is_active(),
      StatusFilter::Finished => status == ProjectStatus::Finished,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
  /// Most recently created first
  #[default]
  Newest,
  Oldest,
}

/// A search over projects, the way the project overview narrows its list.
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
  /// Case-insensitive substring of the name or the client
  pub search: String,
  pub status: StatusFilter,
  pub sort: SortOrder,
}

impl ProjectQuery {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn search(mut self, term: impl Into<String>) -> Self {
    self.search = term.into();
    self
  }

  pub fn status(mut self, status: StatusFilter) -> Self {
    self.status = status;
    self
  }

  pub fn sort(mut self, sort: SortOrder) -> Self {
    self.sort = sort;
    self
  }

  fn matches(&self, project: &Project, needle: &str) -> bool {
    let matches_search = needle.is_empty()
      || project.name.to_lowercase().contains(needle)
      || project.client.to_lowercase().contains(needle);

    matches_search && self.status.matches(project.status)
  }

  /// Apply the query, returning matching projects in the requested order.
  pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
    let needle = self.search.trim().to_lowercase();

    let mut matched: Vec<&Project> = projects
      .iter()
      .filter(|p| self.matches(p, &needle))
      .collect();

    match self.sort {
      SortOrder::Newest => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
      SortOrder::Oldest => matched.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }

    matched
  }
}

/// Totals shown above the project list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
  pub active: usize,
  pub finished: usize,
}

impl StatusCounts {
  pub fn of(projects: &[Project]) -> Self {
    projects.iter().fold(Self::default(), |mut counts, p| {
      if p.status.is_active() {
        counts.active += 1;
      } else {
        counts.finished += 1;
      }
      counts
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::NewProject;

  fn fixture() -> Vec<Project> {
    let mut a = NewProject::named("Gradina Verde", "Popescu").into_project("1".into(), 100);
    a.status = ProjectStatus::InProgress;
    let mut b = NewProject::named("Terasa", "Ionescu SRL").into_project("2".into(), 300);
    b.status = ProjectStatus::OnHold;
    let mut c = NewProject::named("Gard", "Popa").into_project("3".into(), 200);
    c.status = ProjectStatus::Finished;
    vec![a, b, c]
  }

  fn ids(projects: Vec<&Project>) -> Vec<&str> {
    projects.into_iter().map(|p| p.id.as_str()).collect()
  }

  #[test]
  fn test_default_query_sorts_newest_first() {
    let projects = fixture();
    assert_eq!(ids(ProjectQuery::new().apply(&projects)), vec!["2", "3", "1"]);
  }

  #[test]
  fn test_oldest_first() {
    let projects = fixture();
    let query = ProjectQuery::new().sort(SortOrder::Oldest);
    assert_eq!(ids(query.apply(&projects)), vec!["1", "3", "2"]);
  }

  #[test]
  fn test_search_matches_name_or_client_case_insensitively() {
    let projects = fixture();
    assert_eq!(ids(ProjectQuery::new().search("G").apply(&projects)), vec!["3", "1"]);
    assert_eq!(ids(ProjectQuery::new().search("ionescu").apply(&projects)), vec!["2"]);
    assert_eq!(ids(ProjectQuery::new().search("  popa ").apply(&projects)), vec!["3"]);
    assert!(ProjectQuery::new().search("beton").apply(&projects).is_empty());
  }

  #[test]
  fn test_status_filters() {
    let projects = fixture();
    let active = ProjectQuery::new().status(StatusFilter::Active);
    assert_eq!(ids(active.apply(&projects)), vec!["2", "1"]);

    let finished = ProjectQuery::new().status(StatusFilter::Finished).search("g");
    assert_eq!(ids(finished.apply(&projects)), vec!["3"]);
  }

  #[test]
  fn test_status_counts() {
    let counts = StatusCounts::of(&fixture());
    assert_eq!(
      counts,
      StatusCounts {
        active: 2,
        finished: 1
      }
    );
  }
}
