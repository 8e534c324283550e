use chrono::DateTime;
use chrono::FixedOffset;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

/// The subset of a job payload the envelope is computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobTiming {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// One end of the envelope: the winning job and its timestamp, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeEndpoint {
    pub at: String,
    pub job_id: u64,
    pub job_name: Option<String>,
    pub job_url: Option<String>,
    pub job_html_url: Option<String>,
}

/// Earliest job start and latest job completion of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingEnvelope {
    pub started: Option<EnvelopeEndpoint>,
    pub completed: Option<EnvelopeEndpoint>,
}

impl TimingEnvelope {
    pub fn is_empty(&self) -> bool {
        self.started.is_none() && self.completed.is_none()
    }

    /// Flattens the envelope into `jobs_started_at*` / `jobs_completed_at*`
    /// run-document fields. Absent endpoints contribute no fields.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(started) = self.started {
            insert_endpoint(&mut fields, "jobs_started_at", started);
        }
        if let Some(completed) = self.completed {
            insert_endpoint(&mut fields, "jobs_completed_at", completed);
        }
        fields
    }
}

fn insert_endpoint(fields: &mut Map<String, Value>, prefix: &str, endpoint: EnvelopeEndpoint) {
    fields.insert(prefix.to_string(), Value::from(endpoint.at));
    fields.insert(format!("{prefix}_id"), Value::from(endpoint.job_id));
    fields.insert(format!("{prefix}_name"), Value::from(endpoint.job_name));
    fields.insert(format!("{prefix}_url"), Value::from(endpoint.job_url));
    fields.insert(format!("{prefix}_html_url"), Value::from(endpoint.job_html_url));
}

/// Reduces a run's jobs to the earliest-starting and latest-completing job.
///
/// Timestamps are compared as instants, not strings. On equal instants the
/// job seen first wins. Jobs whose timestamp is missing or not RFC 3339 do
/// not compete for that end of the envelope.
pub fn aggregate(jobs: &[JobTiming]) -> TimingEnvelope {
    let mut started: Option<(DateTime<FixedOffset>, &JobTiming)> = None;
    let mut completed: Option<(DateTime<FixedOffset>, &JobTiming)> = None;

    for job in jobs {
        if let Some(at) = parse_timestamp(job.started_at.as_deref())
            && started.is_none_or(|(earliest, _)| at < earliest)
        {
            started = Some((at, job));
        }
        if let Some(at) = parse_timestamp(job.completed_at.as_deref())
            && completed.is_none_or(|(latest, _)| at > latest)
        {
            completed = Some((at, job));
        }
    }

    TimingEnvelope {
        started: started.map(|(_, job)| endpoint(job, job.started_at.as_deref())),
        completed: completed.map(|(_, job)| endpoint(job, job.completed_at.as_deref())),
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value?).ok()
}

fn endpoint(job: &JobTiming, at: Option<&str>) -> EnvelopeEndpoint {
    EnvelopeEndpoint {
        at: at.unwrap_or_default().to_string(),
        job_id: job.id,
        job_name: job.name.clone(),
        job_url: job.url.clone(),
        job_html_url: job.html_url.clone(),
    }
}
