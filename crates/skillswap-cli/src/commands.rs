//! Command handlers. Each returns the text to print on success.

use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use skillswap_core::models::{ExchangeStatus, NewSkill, Proficiency, Registration, SkillUpdate};
use skillswap_core::{ApiError, Config, SessionController};
use tracing::warn;

use crate::cli::{Command, SkillCommand};
use crate::render;

/// Environment variable supplying the login username
const USERNAME_ENV: &str = "SKILLSWAP_USERNAME";

/// Environment variable supplying the login password
const PASSWORD_ENV: &str = "SKILLSWAP_PASSWORD";

/// Why a command did not produce output.
#[derive(Debug)]
pub enum Failure {
    /// The backend or session refused; already recorded as the view notice.
    Api(ApiError),
    /// Local trouble: prompts, config, bad arguments.
    Local(anyhow::Error),
}

impl From<ApiError> for Failure {
    fn from(e: ApiError) -> Self {
        Failure::Api(e)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::Local(e)
    }
}

pub struct Runner<'a> {
    pub controller: &'a SessionController,
    pub config: &'a mut Config,
    pub json: bool,
}

impl Runner<'_> {
    pub async fn run(&mut self, command: Command) -> Result<String, Failure> {
        match command {
            Command::Login { username } => self.login(username).await,
            Command::Logout => Ok(render::view(&self.controller.logout())),
            Command::Whoami => self.whoami(),
            Command::Register { username, email, full_name, bio } => {
                let password = prompt_new_password()?;
                let registration = Registration { username, email, full_name, password, bio };
                self.controller.register(&registration).await?;
                Ok(render::view(&self.controller.view()))
            }
            Command::Skills { category, mine } => {
                let skills = self.controller.skills();
                let list = if mine {
                    skills.mine().await?
                } else {
                    skills.list(category.as_deref()).await?
                };
                let me = self.controller.session().profile();
                self.output(&list, || render::skills(&list, me.as_ref()))
            }
            Command::Skill(cmd) => self.skill(cmd).await,
            Command::Request { skill_id, message } => {
                let created = self.controller.exchanges().create(skill_id, &message).await?;
                self.output(&created, || {
                    format!("Exchange request #{} sent for {}.", created.id, created.skill_title())
                })
            }
            Command::Requests => {
                let requests = self.controller.exchanges().list().await?;
                let me = self.controller.session().profile();
                self.output(&requests, || render::exchanges(&requests, me.as_ref()))
            }
            Command::Respond { request_id, status } => {
                let status: ExchangeStatus = status.parse().map_err(ApiError::Validation)?;
                let updated = self.controller.exchanges().update_status(request_id, status).await?;
                self.output(&updated, || {
                    format!("Request #{} is now {}.", updated.id, updated.status_display())
                })
            }
            Command::Withdraw { request_id } => {
                self.controller.exchanges().delete(request_id).await?;
                Ok(format!("Request #{} withdrawn.", request_id))
            }
            Command::Notifications { read } => {
                let api = self.controller.notifications();
                if let Some(id) = read {
                    api.mark_read(id).await?;
                    return Ok(format!("Notification #{} marked as read.", id));
                }
                let list = api.list().await?;
                self.output(&list, || render::notifications(&list))
            }
            Command::Dashboard => {
                let dashboard = self.controller.dashboard().load().await?;
                let me = self.controller.session().profile();
                self.output(&dashboard.summary, || render::dashboard(me.as_ref(), &dashboard.summary))
            }
        }
    }

    async fn login(&mut self, username: Option<String>) -> Result<String, Failure> {
        let username = match username
            .or_else(|| std::env::var(USERNAME_ENV).ok())
            .or_else(|| self.config.last_username.clone())
        {
            Some(name) => name,
            None => prompt_line("Username: ")?,
        };
        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password(format!("Password for {}: ", username))
                .context("Failed to read password")?,
        };

        self.controller.login(&username, &password).await?;

        self.config.last_username = Some(username.trim().to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        Ok(render::view(&self.controller.view()))
    }

    fn whoami(&self) -> Result<String, Failure> {
        let view = self.controller.view();
        if self.json {
            return to_json(&view);
        }
        Ok(match &view.user {
            Some(user) => render::profile(user),
            None => render::view(&view),
        })
    }

    async fn skill(&mut self, cmd: SkillCommand) -> Result<String, Failure> {
        let api = self.controller.skills();
        match cmd {
            SkillCommand::Add { title, description, category, proficiency, value } => {
                let skill = NewSkill {
                    title,
                    description,
                    category,
                    proficiency_level: parse_proficiency(&proficiency)?,
                    value,
                };
                let created = api.create(&skill).await?;
                self.output(&created, || {
                    format!("Skill #{} added.\n\n{}", created.id, render::skill_detail(&created))
                })
            }
            SkillCommand::Update { id, title, description, category, proficiency, value, active } => {
                let update = SkillUpdate {
                    title,
                    description,
                    category,
                    proficiency_level: proficiency.as_deref().map(parse_proficiency).transpose()?,
                    value,
                    is_active: active,
                };
                let updated = api.update(id, &update).await?;
                self.output(&updated, || render::skill_detail(&updated))
            }
            SkillCommand::Delete { id } => {
                api.delete(id).await?;
                Ok(format!("Skill #{} deleted.", id))
            }
        }
    }

    fn output<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<String, Failure> {
        if self.json {
            to_json(value)
        } else {
            Ok(text())
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, Failure> {
    Ok(serde_json::to_string_pretty(value).context("Failed to encode JSON")?)
}

fn parse_proficiency(raw: &str) -> Result<Proficiency, ApiError> {
    raw.parse().map_err(ApiError::Validation)
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_new_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    let confirm = rpassword::prompt_password("Confirm password: ").context("Failed to read password")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}
