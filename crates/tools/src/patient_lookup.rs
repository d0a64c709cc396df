//! Patient lookup tool over a fixed record set.
//!
//! Demo records only — a deployment would swap in an EHR-backed
//! implementation of the same tool name and schema. Name matching is
//! case-insensitive and tolerates partial names ("Juan" finds Juan de
//! Marco); an unknown patient is a successful execution with a not-found
//! message, not an error, so the engine can rephrase or ask.

use async_trait::async_trait;
use serde::Serialize;
use wardline_core::{Tool, ToolError, ToolOutput};

#[derive(Debug, Clone, Serialize)]
struct PatientRecord {
    name: String,
    age: u32,
    medications: Vec<Medication>,
    allergies: Vec<String>,
    notes: String,
}

#[derive(Debug, Clone, Serialize)]
struct Medication {
    name: String,
    dose: String,
    frequency: String,
}

pub struct PatientLookupTool {
    records: Vec<PatientRecord>,
}

impl PatientLookupTool {
    pub fn with_demo_records() -> Self {
        let records = vec![
            PatientRecord {
                name: "Juan de Marco".into(),
                age: 65,
                medications: vec![
                    Medication {
                        name: "Oxycodone".into(),
                        dose: "5 mg".into(),
                        frequency: "every 6 hours as needed".into(),
                    },
                    Medication {
                        name: "Metformin".into(),
                        dose: "500 mg".into(),
                        frequency: "twice daily".into(),
                    },
                    Medication {
                        name: "Lisinopril".into(),
                        dose: "10 mg".into(),
                        frequency: "once daily".into(),
                    },
                ],
                allergies: vec!["Penicillin".into()],
                notes: "Post-operative day 2, hip replacement. Pain managed.".into(),
            },
            PatientRecord {
                name: "Maria Silva".into(),
                age: 45,
                medications: vec![
                    Medication {
                        name: "Ibuprofen".into(),
                        dose: "400 mg".into(),
                        frequency: "three times daily with food".into(),
                    },
                    Medication {
                        name: "Omeprazole".into(),
                        dose: "20 mg".into(),
                        frequency: "once daily before breakfast".into(),
                    },
                ],
                allergies: vec![],
                notes: "Admitted for observation, lower back injury.".into(),
            },
            PatientRecord {
                name: "Robert Johnson".into(),
                age: 72,
                medications: vec![
                    Medication {
                        name: "Morphine".into(),
                        dose: "10 mg".into(),
                        frequency: "every 4 hours as needed".into(),
                    },
                    Medication {
                        name: "Warfarin".into(),
                        dose: "5 mg".into(),
                        frequency: "once daily, INR monitored".into(),
                    },
                ],
                allergies: vec!["Sulfa drugs".into()],
                notes: "Cardiac ward. Anticoagulation under review.".into(),
            },
        ];
        Self { records }
    }

    fn find(&self, name: &str) -> Option<&PatientRecord> {
        let needle = name.to_lowercase();
        self.records.iter().find(|r| {
            let full = r.name.to_lowercase();
            full == needle || full.contains(&needle) || needle.contains(&full)
        })
    }
}

#[async_trait]
impl Tool for PatientLookupTool {
    fn name(&self) -> &str {
        "patient_lookup"
    }

    fn description(&self) -> &str {
        "Look up a patient's current medications, allergies, and care notes by name. \
         Use the patient's full name when known."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "patient_name": {
                    "type": "string",
                    "description": "The patient's name, full or partial"
                }
            },
            "required": ["patient_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let name = arguments["patient_name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'patient_name' must be a string".into()))?;

        match self.find(name) {
            Some(record) => {
                let output = serde_json::to_string_pretty(record).unwrap_or_default();
                Ok(ToolOutput {
                    call_id: String::new(),
                    success: true,
                    output,
                    data: serde_json::to_value(record).ok(),
                })
            }
            None => Ok(ToolOutput {
                call_id: String::new(),
                success: true,
                output: format!(
                    "No patient record found matching '{name}'. \
                     Check the spelling or use the full name."
                ),
                data: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn full_name_lookup() {
        let tool = PatientLookupTool::with_demo_records();
        let result = tool
            .execute(serde_json::json!({"patient_name": "Juan de Marco"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("Oxycodone"));
        assert!(result.output.contains("Penicillin"));
        assert!(result.data.is_some());
    }

    #[tokio::test]
    async fn partial_name_lookup() {
        let tool = PatientLookupTool::with_demo_records();
        let result = tool
            .execute(serde_json::json!({"patient_name": "maria"}))
            .await
            .unwrap();

        assert!(result.output.contains("Ibuprofen"));
    }

    #[tokio::test]
    async fn unknown_patient_is_not_an_error() {
        let tool = PatientLookupTool::with_demo_records();
        let result = tool
            .execute(serde_json::json!({"patient_name": "Nobody Here"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("No patient record found"));
        assert!(result.data.is_none());
    }

    #[tokio::test]
    async fn non_string_name_rejected() {
        let tool = PatientLookupTool::with_demo_records();
        let result = tool.execute(serde_json::json!({"patient_name": 42})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn declaration_carries_required_field() {
        let tool = PatientLookupTool::with_demo_records();
        let decl = tool.to_declaration();
        assert_eq!(decl.name, "patient_lookup");
        assert_eq!(decl.parameters["required"][0], "patient_name");
    }
}
