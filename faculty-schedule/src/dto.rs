//! JSON shapes exchanged over HTTP.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::entity::{Routine, StudyGroup, Teacher};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeacherDto {
    pub teacher_id: Option<i64>,
    pub name: String,
    pub department: String,
    pub email: String,
}

impl From<Teacher> for TeacherDto {
    fn from(teacher: Teacher) -> Self {
        Self {
            teacher_id: Some(teacher.teacher_id),
            name: teacher.name,
            department: teacher.department,
            email: teacher.email,
        }
    }
}

impl TeacherDto {
    pub fn into_entity(self) -> Teacher {
        Teacher {
            teacher_id: self.teacher_id.unwrap_or_default(),
            name: self.name,
            department: self.department,
            email: self.email,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyGroupDto {
    pub group_id: Option<i64>,
    pub group_name: String,
    pub description: String,
}

impl From<StudyGroup> for StudyGroupDto {
    fn from(group: StudyGroup) -> Self {
        Self {
            group_id: Some(group.group_id),
            group_name: group.group_name,
            description: group.description,
        }
    }
}

impl StudyGroupDto {
    pub fn into_entity(self) -> StudyGroup {
        StudyGroup {
            group_id: self.group_id.unwrap_or_default(),
            group_name: self.group_name,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineDto {
    #[serde(default)]
    pub routine_id: Option<i64>,
    #[serde(with = "wall_clock")]
    pub start_time: NaiveTime,
    #[serde(with = "wall_clock")]
    pub end_time: NaiveTime,
    pub routine_date: NaiveDate,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub group_id: Option<i64>,
}

impl From<Routine> for RoutineDto {
    fn from(routine: Routine) -> Self {
        Self {
            routine_id: Some(routine.routine_id),
            start_time: routine.start_time,
            end_time: routine.end_time,
            routine_date: routine.routine_date,
            teacher_id: routine.teacher_id,
            group_id: routine.group_id,
        }
    }
}

/// `HH:MM:SS` on output; `HH:MM` or `HH:MM:SS` on input.
mod wall_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

    pub fn serialize<S: Serializer>(
        time: &NaiveTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M:%S"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(&raw, fmt).ok())
            .ok_or_else(|| {
                de::Error::custom(format!("invalid time of day `{raw}`"))
            })
    }
}
