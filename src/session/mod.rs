use chrono::NaiveDate;
use tracing::warn;

use crate::genre::GenreMap;
use crate::records::{ProjectRecord, TalentListOption, TalentRecord};
use crate::remote::Executor;
use crate::search::filters::SearchCriteria;
use crate::search::{self, ActionError};

/// Outcome of one user action, ready to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The action produced this many rows.
    Found(usize),
    /// The query ran but matched nothing.
    Empty(String),
    /// The query could not run or its output could not be read. State from
    /// before the action is untouched.
    Failed(String),
}

impl Notice {
    fn from_error(action: &str, err: ActionError) -> Self {
        warn!("{action} failed: {err}");
        Notice::Failed(format!("{action} failed: {err}"))
    }
}

/// Per-user browsing state: the current criteria, the projects they found,
/// and the project → talent list → talents selection chain.
pub struct Session<'g> {
    genres: &'g GenreMap,
    today: NaiveDate,
    pub criteria: SearchCriteria,
    projects: Vec<ProjectRecord>,
    selected_project: Option<String>,
    talent_lists: Vec<TalentListOption>,
    selected_list: Option<String>,
    talents: Vec<TalentRecord>,
}

impl<'g> Session<'g> {
    pub fn new(genres: &'g GenreMap, today: NaiveDate) -> Self {
        Self {
            genres,
            today,
            criteria: SearchCriteria::default(),
            projects: Vec::new(),
            selected_project: None,
            talent_lists: Vec::new(),
            selected_list: None,
            talents: Vec::new(),
        }
    }

    pub fn reset_criteria(&mut self) {
        self.criteria = SearchCriteria::default();
    }

    /// Run the project search with the current criteria. A successful search
    /// replaces the results and clears the selection chain.
    pub fn search(&mut self, exec: &dyn Executor) -> Notice {
        match search::search_projects(exec, &self.criteria, self.genres) {
            Ok(projects) => {
                self.projects = projects;
                self.clear_project_selection();
                if self.projects.is_empty() {
                    Notice::Empty("No projects match the search criteria.".to_string())
                } else {
                    Notice::Found(self.projects.len())
                }
            }
            Err(e) => Notice::from_error("Project search", e),
        }
    }

    /// Select a project from the current results and load its talent lists.
    pub fn select_project(&mut self, exec: &dyn Executor, project_id: &str) -> Notice {
        if !self.projects.iter().any(|p| p.id == project_id) {
            return Notice::Failed(format!("Project {project_id} is not in the current results."));
        }

        match search::list_talent_lists(exec, project_id) {
            Ok(lists) => {
                self.selected_project = Some(project_id.to_string());
                self.talent_lists = lists;
                self.selected_list = None;
                self.talents.clear();
                if self.talent_lists.is_empty() {
                    Notice::Empty("This project has no talent lists.".to_string())
                } else {
                    Notice::Found(self.talent_lists.len())
                }
            }
            Err(e) => Notice::from_error("Loading talent lists", e),
        }
    }

    /// Select one of the selected project's talent lists and load its talents.
    pub fn select_talent_list(&mut self, exec: &dyn Executor, list_id: &str) -> Notice {
        let Some(project_id) = self.selected_project.clone() else {
            return Notice::Failed("Select a project first.".to_string());
        };
        if !self.talent_lists.iter().any(|l| l.id == list_id) {
            return Notice::Failed(format!("Talent list {list_id} does not belong to project {project_id}."));
        }

        match search::fetch_talents(exec, &project_id, list_id, self.today) {
            Ok(talents) => {
                self.selected_list = Some(list_id.to_string());
                self.talents = talents;
                if self.talents.is_empty() {
                    Notice::Empty("No talents on the selected list.".to_string())
                } else {
                    Notice::Found(self.talents.len())
                }
            }
            Err(e) => Notice::from_error("Loading talents", e),
        }
    }

    fn clear_project_selection(&mut self) {
        self.selected_project = None;
        self.talent_lists.clear();
        self.selected_list = None;
        self.talents.clear();
    }

    pub fn projects(&self) -> &[ProjectRecord] {
        &self.projects
    }

    pub fn selected_project(&self) -> Option<&ProjectRecord> {
        let id = self.selected_project.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn talent_lists(&self) -> &[TalentListOption] {
        &self.talent_lists
    }

    pub fn selected_talent_list(&self) -> Option<&TalentListOption> {
        let id = self.selected_list.as_deref()?;
        self.talent_lists.iter().find(|l| l.id == id)
    }

    pub fn talents(&self) -> &[TalentRecord] {
        &self.talents
    }
}
