use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub class_room: String,
    #[serde(default = "default_gender")]
    pub gender: String,
}

fn default_gender() -> String {
    "Femmina".to_string()
}

impl Default for StudentProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            surname: String::new(),
            age: None,
            school: String::new(),
            class_room: String::new(),
            gender: default_gender(),
        }
    }
}

impl StudentProfile {
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            "Studente".to_string()
        } else {
            format!("{} {}", self.name, self.surname).trim().to_string()
        }
    }

    pub fn school_label(&self) -> &str {
        if self.school.trim().is_empty() {
            "Scuola non impostata"
        } else {
            &self.school
        }
    }

    /// Set a field by its wire name (`name`, `surname`, `age`, `school`,
    /// `classRoom`, `gender`).
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), String> {
        match field {
            "name" => self.name = value.to_string(),
            "surname" => self.surname = value.to_string(),
            "school" => self.school = value.to_string(),
            "classRoom" | "class_room" | "class" => self.class_room = value.to_string(),
            "gender" => self.gender = value.to_string(),
            "age" => {
                self.age = if value.trim().is_empty() {
                    None
                } else {
                    Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| format!("invalid age '{value}'"))?,
                    )
                }
            }
            other => return Err(format!("unknown profile field '{other}'")),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
}
