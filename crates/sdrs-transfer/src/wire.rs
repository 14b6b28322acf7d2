//! Storage Transfer REST API wire model.
//!
//! The service speaks camelCase JSON with calendar dates split into
//! year/month/day objects. These types mirror only the fields SDRS reads or
//! writes and convert to and from the [`TransferJob`] boundary type.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use sdrs_core::error::AppError;
use sdrs_core::result::AppResult;
use sdrs_core::traits::transfer::{TransferJob, TransferJobStatus, TransferSpec};

/// Calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Time of day (UTC).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub schedule_start_date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_end_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_of_day: Option<TimeOfDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsData {
    pub bucket_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectConditions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_time_elapsed_since_last_modification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOptions {
    pub delete_objects_from_source_after_transfer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransferSpec {
    pub gcs_data_source: GcsData,
    pub gcs_data_sink: GcsData,
    #[serde(default)]
    pub object_conditions: ObjectConditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_options: Option<TransferOptions>,
}

/// A transfer job as serialized by the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransferJob {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub project_id: String,
    #[serde(default)]
    pub description: String,
    pub status: TransferJobStatus,
    pub transfer_spec: WireTransferSpec,
    pub schedule: Schedule,
}

/// Body of `PATCH /v1/{jobName}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransferJobRequest {
    pub project_id: String,
    pub transfer_job: WireTransferJob,
    pub update_transfer_job_field_mask: String,
}

impl From<DateTime<Utc>> for Date {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
        }
    }
}

impl From<&TransferJob> for WireTransferJob {
    fn from(job: &TransferJob) -> Self {
        let spec = &job.spec;
        let start = Date::from(spec.schedule_time);
        Self {
            name: job.name.clone(),
            project_id: job.project_id.clone(),
            description: job.description.clone(),
            status: job.status,
            transfer_spec: WireTransferSpec {
                gcs_data_source: GcsData {
                    bucket_name: spec.source_bucket.clone(),
                },
                gcs_data_sink: GcsData {
                    bucket_name: spec.destination_bucket.clone(),
                },
                object_conditions: ObjectConditions {
                    include_prefixes: spec.include_prefixes.clone(),
                    exclude_prefixes: spec.exclude_prefixes.clone(),
                    min_time_elapsed_since_last_modification: spec.min_retention_duration.clone(),
                },
                transfer_options: Some(TransferOptions {
                    delete_objects_from_source_after_transfer: true,
                }),
            },
            schedule: Schedule {
                schedule_start_date: start,
                schedule_end_date: (!spec.recurring).then_some(start),
                start_time_of_day: Some(TimeOfDay {
                    hours: spec.schedule_time.hour(),
                    minutes: spec.schedule_time.minute(),
                    seconds: spec.schedule_time.second(),
                }),
            },
        }
    }
}

impl TryFrom<WireTransferJob> for TransferJob {
    type Error = AppError;

    fn try_from(wire: WireTransferJob) -> AppResult<Self> {
        let start = wire.schedule.schedule_start_date;
        let date = NaiveDate::from_ymd_opt(start.year, start.month, start.day).ok_or_else(|| {
            AppError::external_service(format!(
                "Transfer job {} has an invalid start date",
                wire.name
            ))
        })?;
        let tod = wire.schedule.start_time_of_day.unwrap_or_default();
        let time = NaiveTime::from_hms_opt(tod.hours, tod.minutes, tod.seconds).ok_or_else(|| {
            AppError::external_service(format!(
                "Transfer job {} has an invalid start time",
                wire.name
            ))
        })?;
        let schedule_time = Utc.from_utc_datetime(&date.and_time(time));
        let recurring = wire.schedule.schedule_end_date != Some(start);

        let conditions = wire.transfer_spec.object_conditions;
        Ok(Self {
            name: wire.name,
            project_id: wire.project_id,
            description: wire.description,
            status: wire.status,
            spec: TransferSpec {
                source_bucket: wire.transfer_spec.gcs_data_source.bucket_name,
                destination_bucket: wire.transfer_spec.gcs_data_sink.bucket_name,
                include_prefixes: conditions.include_prefixes,
                exclude_prefixes: conditions.exclude_prefixes,
                min_retention_duration: conditions.min_time_elapsed_since_last_modification,
                schedule_time,
                recurring,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_service_payload() {
        let payload = serde_json::json!({
            "name": "transferJobs/123",
            "projectId": "project",
            "description": "Rule 1 2 2026-01-01T03:00:00+00:00",
            "status": "ENABLED",
            "transferSpec": {
                "gcsDataSource": {"bucketName": "bucket"},
                "gcsDataSink": {"bucketName": "bucketshadow"},
                "objectConditions": {
                    "excludePrefixes": ["b/", "a/"],
                    "minTimeElapsedSinceLastModification": "2592000s"
                }
            },
            "schedule": {
                "scheduleStartDate": {"year": 2026, "month": 1, "day": 1},
                "startTimeOfDay": {"hours": 3}
            }
        });

        let wire: WireTransferJob = serde_json::from_value(payload).unwrap();
        let job = TransferJob::try_from(wire).unwrap();
        assert_eq!(job.spec.exclude_prefixes, ["b/", "a/"]);
        assert_eq!(job.spec.min_retention_duration.as_deref(), Some("2592000s"));
        assert!(job.spec.recurring);
        assert_eq!(job.spec.schedule_time.to_rfc3339(), "2026-01-01T03:00:00+00:00");
    }

    #[test]
    fn test_one_shot_sets_end_date() {
        let job = TransferJob {
            name: String::new(),
            project_id: "project".into(),
            description: "Rule User gs://b/d/ now".into(),
            status: TransferJobStatus::Enabled,
            spec: TransferSpec {
                source_bucket: "b".into(),
                destination_bucket: "bshadow".into(),
                include_prefixes: vec!["d/".into()],
                exclude_prefixes: Vec::new(),
                min_retention_duration: None,
                schedule_time: Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap(),
                recurring: false,
            },
        };

        let wire = WireTransferJob::from(&job);
        assert_eq!(wire.schedule.schedule_end_date, Some(wire.schedule.schedule_start_date));

        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("name").is_none());
        assert_eq!(
            json["transferSpec"]["objectConditions"]["includePrefixes"][0],
            "d/"
        );
        assert!(json["transferSpec"]["objectConditions"].get("excludePrefixes").is_none());
    }
}
