use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::ProjectId;

/// Gradient applied to project cards when the admin leaves it blank.
pub const DEFAULT_GRADIENT: &str = "from-blue-600 to-indigo-600";

/// A portfolio project as persisted and served to the marketing site.
///
/// `images` is kept in display order; the gallery reconciler is the only
/// writer of that list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub subtitle: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub gradient: String,
    pub client: Option<String>,
    pub timeline: Option<String>,
    pub role: Option<String>,
    pub uploaded_by: Option<String>,
    pub challenges: Vec<String>,
    pub solutions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw descriptive fields of a project form submission.
///
/// Every field is optional at this level; [`ProjectFields::into_new_project`]
/// and [`ProjectFields::into_patch`] apply create and update semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFields {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub gradient: Option<String>,
    pub client: Option<String>,
    pub timeline: Option<String>,
    pub role: Option<String>,
    pub uploaded_by: Option<String>,
    pub challenges: Option<String>,
    pub solutions: Option<String>,
}

impl ProjectFields {
    /// Assign a form field by its wire name. Unknown names are ignored and
    /// reported back as `false`.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "title" => &mut self.title,
            "subtitle" => &mut self.subtitle,
            "category" => &mut self.category,
            "description" => &mut self.description,
            "tags" => &mut self.tags,
            "gradient" => &mut self.gradient,
            "client" => &mut self.client,
            "timeline" => &mut self.timeline,
            "role" => &mut self.role,
            "uploadedBy" => &mut self.uploaded_by,
            "challenges" => &mut self.challenges,
            "solutions" => &mut self.solutions,
            _ => return false,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
        true
    }

    pub fn into_new_project(self) -> Result<NewProject> {
        let title =
            non_blank(self.title).ok_or(ModelError::MissingField("title"))?;
        let category = non_blank(self.category)
            .ok_or(ModelError::MissingField("category"))?;

        Ok(NewProject {
            title: title.trim().to_string(),
            subtitle: non_blank(self.subtitle),
            category: category.trim().to_string(),
            description: non_blank(self.description),
            tags: self.tags.as_deref().map(split_tags).unwrap_or_default(),
            gradient: non_blank(self.gradient)
                .unwrap_or_else(|| DEFAULT_GRADIENT.to_string()),
            client: non_blank(self.client),
            timeline: non_blank(self.timeline),
            role: non_blank(self.role),
            uploaded_by: non_blank(self.uploaded_by),
            challenges: self
                .challenges
                .as_deref()
                .map(split_lines)
                .unwrap_or_default(),
            solutions: self
                .solutions
                .as_deref()
                .map(split_lines)
                .unwrap_or_default(),
        })
    }

    pub fn into_patch(self) -> ProjectPatch {
        ProjectPatch {
            title: non_blank(self.title).map(|t| t.trim().to_string()),
            subtitle: non_blank(self.subtitle),
            category: non_blank(self.category).map(|c| c.trim().to_string()),
            description: non_blank(self.description),
            tags: non_blank(self.tags).map(|raw| split_tags(&raw)),
            gradient: non_blank(self.gradient),
            client: non_blank(self.client),
            timeline: non_blank(self.timeline),
            role: non_blank(self.role),
            challenges: non_blank(self.challenges).map(|raw| split_lines(&raw)),
            solutions: non_blank(self.solutions).map(|raw| split_lines(&raw)),
        }
    }
}

/// Validated descriptive fields for a project about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub subtitle: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub gradient: String,
    pub client: Option<String>,
    pub timeline: Option<String>,
    pub role: Option<String>,
    pub uploaded_by: Option<String>,
    pub challenges: Vec<String>,
    pub solutions: Vec<String>,
}

impl NewProject {
    pub fn into_project(
        self,
        images: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Project {
        Project {
            id: ProjectId::new(),
            title: self.title,
            subtitle: self.subtitle,
            category: self.category,
            description: self.description,
            images,
            tags: self.tags,
            gradient: self.gradient,
            client: self.client,
            timeline: self.timeline,
            role: self.role,
            uploaded_by: self.uploaded_by,
            challenges: self.challenges,
            solutions: self.solutions,
            created_at,
        }
    }
}

/// Partial update of a project's descriptive fields. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub gradient: Option<String>,
    pub client: Option<String>,
    pub timeline: Option<String>,
    pub role: Option<String>,
    pub challenges: Option<Vec<String>>,
    pub solutions: Option<Vec<String>>,
}

impl ProjectPatch {
    pub fn apply(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(category) = self.category {
            project.category = category;
        }
        if let Some(gradient) = self.gradient {
            project.gradient = gradient;
        }
        if let Some(tags) = self.tags {
            project.tags = tags;
        }
        if let Some(challenges) = self.challenges {
            project.challenges = challenges;
        }
        if let Some(solutions) = self.solutions {
            project.solutions = solutions;
        }
        replace_if_some(&mut project.subtitle, self.subtitle);
        replace_if_some(&mut project.description, self.description);
        replace_if_some(&mut project.client, self.client);
        replace_if_some(&mut project.timeline, self.timeline);
        replace_if_some(&mut project.role, self.role);
    }
}

fn replace_if_some(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Split a comma separated tag list, trimming entries and dropping empties.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a multi-line text area into trimmed, non-empty lines.
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
