use crate::entities::{prelude::*, user_settings};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Repository for per-user settings: timezone and disabled apps.
pub struct UserSettingsRepository {
    conn: DatabaseConnection,
}

impl UserSettingsRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_timezone(&self, user_id: &str) -> Result<Option<String>> {
        let row = UserSettings::find_by_id(user_id).one(&self.conn).await?;

        Ok(row.and_then(|s| s.timezone))
    }

    pub async fn get_disabled_apps(&self, user_id: &str) -> Result<Vec<String>> {
        let row = UserSettings::find_by_id(user_id).one(&self.conn).await?;

        let apps = row
            .map(|s| serde_json::from_str(&s.disabled_apps).unwrap_or_default())
            .unwrap_or_default();

        Ok(apps)
    }

    pub async fn set_timezone(&self, user_id: &str, timezone: Option<&str>) -> Result<()> {
        let existing = UserSettings::find_by_id(user_id).one(&self.conn).await?;

        match existing {
            Some(model) => {
                let mut active: user_settings::ActiveModel = model.into();
                active.timezone = Set(timezone.map(ToString::to_string));
                active.update(&self.conn).await?;
            }
            None => {
                user_settings::ActiveModel {
                    user_id: Set(user_id.to_string()),
                    timezone: Set(timezone.map(ToString::to_string)),
                    disabled_apps: Set("[]".to_string()),
                }
                .insert(&self.conn)
                .await?;
            }
        }

        Ok(())
    }

    pub async fn set_disabled_apps(&self, user_id: &str, apps: &[String]) -> Result<()> {
        let encoded = serde_json::to_string(apps)?;
        let existing = UserSettings::find_by_id(user_id).one(&self.conn).await?;

        match existing {
            Some(model) => {
                let mut active: user_settings::ActiveModel = model.into();
                active.disabled_apps = Set(encoded);
                active.update(&self.conn).await?;
            }
            None => {
                user_settings::ActiveModel {
                    user_id: Set(user_id.to_string()),
                    timezone: Set(None),
                    disabled_apps: Set(encoded),
                }
                .insert(&self.conn)
                .await?;
            }
        }

        Ok(())
    }
}
