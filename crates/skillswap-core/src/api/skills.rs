use reqwest::Url;

use super::{ApiError, Dispatcher};
use crate::models::{NewSkill, Skill, SkillUpdate};

/// Skill listing endpoints.
#[derive(Clone)]
pub struct SkillsApi {
    dispatcher: Dispatcher,
}

impl SkillsApi {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// All active skills, optionally filtered by category. Works anonymously.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Skill>, ApiError> {
        let path = match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => with_query("/skills/", &[("category", category)]),
            None => "/skills/".to_string(),
        };
        self.dispatcher.get(&path).await
    }

    pub async fn get(&self, id: i64) -> Result<Skill, ApiError> {
        self.dispatcher.get(&format!("/skills/{}", id)).await
    }

    /// Skills offered by the signed-in user.
    pub async fn mine(&self) -> Result<Vec<Skill>, ApiError> {
        self.dispatcher.get("/skills/my-skills").await
    }

    pub async fn create(&self, skill: &NewSkill) -> Result<Skill, ApiError> {
        skill.validate().map_err(ApiError::Validation)?;
        self.dispatcher.post("/skills/", skill).await
    }

    pub async fn update(&self, id: i64, update: &SkillUpdate) -> Result<Skill, ApiError> {
        update.validate().map_err(ApiError::Validation)?;
        self.dispatcher.put(&format!("/skills/{}", id), update).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.dispatcher.delete(&format!("/skills/{}", id)).await?;
        Ok(())
    }
}

/// Append url-encoded query parameters to an endpoint path.
pub(crate) fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    // Any base works; only the encoded query is kept.
    match Url::parse(&format!("http://localhost{}", path)) {
        Ok(mut url) => {
            url.query_pairs_mut().extend_pairs(params.iter().copied());
            match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            }
        }
        Err(_) => path.to_string(),
    }
}
