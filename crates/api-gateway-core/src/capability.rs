// crates/api-gateway-core/src/capability.rs
// ============================================================================
// Module: Capability Identifiers
// Description: Canonical capability names exposed by the gateway.
// Purpose: Closed enumeration shared by registry population and callers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Canonical capability identifiers. These names are part of the external
//! contract surface of `GET /tools` and `POST /tools/execute`.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Backend operation family a capability belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityFamily {
    /// Student records.
    Student,
    /// Staff records.
    Staff,
    /// Courses and enrollment.
    Course,
    /// Grades.
    Grade,
    /// Course homework.
    Homework,
    /// Course announcements.
    Announcement,
    /// Chat assistant.
    Chat,
}

impl CapabilityFamily {
    /// Every family, in registration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Student,
            Self::Staff,
            Self::Course,
            Self::Grade,
            Self::Homework,
            Self::Announcement,
            Self::Chat,
        ]
    }

    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
            Self::Course => "course",
            Self::Grade => "grade",
            Self::Homework => "homework",
            Self::Announcement => "announcement",
            Self::Chat => "chat",
        }
    }

    /// Returns the capabilities in this family.
    pub fn members(self) -> impl Iterator<Item = CapabilityName> {
        CapabilityName::all().iter().copied().filter(move |name| name.family() == self)
    }
}

/// Canonical capability names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityName {
    /// Fetch a student by id.
    GetStudent,
    /// Create a student.
    CreateStudent,
    /// Fetch a staff member by id.
    GetStaff,
    /// Create a staff member.
    CreateStaff,
    /// Fetch a course by id.
    GetCourse,
    /// Create a course.
    CreateCourse,
    /// List students enrolled in a course.
    GetCourseStudents,
    /// List a student's grades in a course and semester.
    GetStudentCourseGrades,
    /// Record a grade.
    CreateGrade,
    /// List homework for a course.
    GetCourseHomework,
    /// Create a homework assignment.
    CreateHomework,
    /// List announcements for a course.
    GetCourseAnnouncements,
    /// Post an announcement.
    CreateAnnouncement,
    /// Send a message to the course chat assistant.
    ProcessChatMessage,
}

impl CapabilityName {
    /// Returns the canonical string name for the capability.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetStudent => "get_student",
            Self::CreateStudent => "create_student",
            Self::GetStaff => "get_staff",
            Self::CreateStaff => "create_staff",
            Self::GetCourse => "get_course",
            Self::CreateCourse => "create_course",
            Self::GetCourseStudents => "get_course_students",
            Self::GetStudentCourseGrades => "get_student_course_grades",
            Self::CreateGrade => "create_grade",
            Self::GetCourseHomework => "get_course_homework",
            Self::CreateHomework => "create_homework",
            Self::GetCourseAnnouncements => "get_course_announcements",
            Self::CreateAnnouncement => "create_announcement",
            Self::ProcessChatMessage => "process_chat_message",
        }
    }

    /// Returns all capability names in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::GetStudent,
            Self::CreateStudent,
            Self::GetStaff,
            Self::CreateStaff,
            Self::GetCourse,
            Self::CreateCourse,
            Self::GetCourseStudents,
            Self::GetStudentCourseGrades,
            Self::CreateGrade,
            Self::GetCourseHomework,
            Self::CreateHomework,
            Self::GetCourseAnnouncements,
            Self::CreateAnnouncement,
            Self::ProcessChatMessage,
        ]
    }

    /// Parses a capability name from its string representation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|candidate| candidate.as_str() == name)
    }

    /// Returns the operation family.
    #[must_use]
    pub const fn family(self) -> CapabilityFamily {
        match self {
            Self::GetStudent | Self::CreateStudent => CapabilityFamily::Student,
            Self::GetStaff | Self::CreateStaff => CapabilityFamily::Staff,
            Self::GetCourse | Self::CreateCourse | Self::GetCourseStudents => {
                CapabilityFamily::Course
            }
            Self::GetStudentCourseGrades | Self::CreateGrade => CapabilityFamily::Grade,
            Self::GetCourseHomework | Self::CreateHomework => CapabilityFamily::Homework,
            Self::GetCourseAnnouncements | Self::CreateAnnouncement => {
                CapabilityFamily::Announcement
            }
            Self::ProcessChatMessage => CapabilityFamily::Chat,
        }
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::CapabilityFamily;
    use super::CapabilityName;

    #[test]
    fn every_name_belongs_to_exactly_one_family() {
        let total: usize =
            CapabilityFamily::all().iter().map(|family| family.members().count()).sum();
        assert_eq!(total, CapabilityName::all().len());
        let courses: Vec<_> = CapabilityFamily::Course.members().collect();
        assert_eq!(
            courses,
            vec![
                CapabilityName::GetCourse,
                CapabilityName::CreateCourse,
                CapabilityName::GetCourseStudents
            ]
        );
        assert_eq!(CapabilityName::ProcessChatMessage.family().as_str(), "chat");
    }

    #[test]
    fn parse_accepts_every_canonical_name() {
        for name in CapabilityName::all() {
            assert_eq!(CapabilityName::parse(name.as_str()), Some(*name));
        }
        assert_eq!(CapabilityName::parse("delete_student"), None);
    }
}
