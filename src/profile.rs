//! Profile records and the mutable form they are edited through.
//!
//! Two profiles are collected per submission:
//! * Interviewee (name, email, education, experience)
//! * Interviewer (name, education, experience)

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;

/// The person preparing for the interview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervieweeProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience: String,
}

/// The person expected to conduct the interview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewerProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience: String,
}

/// The payload sent to the prediction service. Field names match the wire
/// contract of `POST /api/predict-questions/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub interviewee: IntervieweeProfile,
    pub interviewer: InterviewerProfile,
}

/// A well-formed success payload from the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredictResponse {
    /// The rendered interview plan as an HTML document.
    pub html: String,
}

/// Mutable holder for the two profiles while the user edits them.
///
/// The form owns required-field validation; the submission layer only ever
/// sees the immutable snapshot taken when a submission starts.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub interviewee: IntervieweeProfile,
    pub interviewer: InterviewerProfile,
}

impl ProfileForm {
    /// Take an immutable snapshot of the current field values. Edits made
    /// after this call do not affect the returned request.
    pub fn snapshot(&self) -> PredictRequest {
        PredictRequest {
            interviewee: self.interviewee.clone(),
            interviewer: self.interviewer.clone(),
        }
    }

    /// Names of declared fields that are still empty, in display order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let fields = [
            ("interviewee.name", &self.interviewee.name),
            ("interviewee.email", &self.interviewee.email),
            ("interviewee.education", &self.interviewee.education),
            ("interviewee.experience", &self.interviewee.experience),
            ("interviewer.name", &self.interviewer.name),
            ("interviewer.education", &self.interviewer.education),
            ("interviewer.experience", &self.interviewer.experience),
        ];
        for (label, value) in fields {
            if value.trim().is_empty() {
                missing.push(label);
            }
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

impl IntervieweeProfile {
    /// Loads an interviewee profile from a JSON file at the given path.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        load_json(path)
    }
}

impl InterviewerProfile {
    /// Loads an interviewer profile from a JSON file at the given path.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        load_json(path)
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, std::io::Error> {
    let buf = std::fs::read(path)?;
    serde_json::from_slice(&buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Display for IntervieweeProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interviewee: {} <{}>", self.name, self.email)
    }
}

impl Display for InterviewerProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interviewer: {}", self.name)
    }
}
