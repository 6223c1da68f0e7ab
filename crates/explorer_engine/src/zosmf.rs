use bytes::{Bytes, BytesMut};
use explorer_core::{Job, SpoolFile};
use explorer_logging::{explorer_debug, explorer_trace};
use futures_util::StreamExt;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    ExplorerSettings, JesApi, JesError, JesResult, JobQueryParams, ProfileConfig, SpoolDownload,
};

const RESTJOBS: [&str; 3] = ["zosmf", "restjobs", "jobs"];
const RESTCONSOLES: [&str; 3] = ["zosmf", "restconsoles", "consoles"];
const CSRF_HEADER: &str = "X-CSRF-ZOSMF-HEADER";
const DEFAULT_CONSOLE: &str = "defcn";

#[derive(Debug, Serialize)]
struct JobActionRequest<'a> {
    request: &'a str,
    version: &'a str,
}

#[derive(Debug, Deserialize)]
struct JobFeedback {
    #[serde(default)]
    status: i32,
}

#[derive(Debug, Serialize)]
struct ConsoleRequest<'a> {
    cmd: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConsoleResponse {
    #[serde(rename = "cmd-response", default)]
    cmd_response: String,
}

/// [`JesApi`] over the z/OSMF REST jobs and console services.
#[derive(Debug, Clone)]
pub struct ZosmfJesApi {
    profile: String,
    base_url: Url,
    user: Option<String>,
    password: Option<String>,
    console_name: String,
    client: reqwest::Client,
}

impl ZosmfJesApi {
    pub fn new(profile: &ProfileConfig, settings: &ExplorerSettings) -> JesResult<Self> {
        let base_url = Url::parse(&profile.base_url).map_err(|err| {
            JesError::Network(format!("invalid base url {}: {err}", profile.base_url))
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .build()
            .map_err(|err| JesError::Network(err.to_string()))?;
        Ok(Self {
            profile: profile.name.clone(),
            base_url,
            user: profile.user.clone(),
            password: profile.password.clone(),
            console_name: profile
                .console_name
                .clone()
                .unwrap_or_else(|| DEFAULT_CONSOLE.to_string()),
            client,
        })
    }

    fn endpoint(&self, root: &[&str], segments: &[&str]) -> JesResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| JesError::Network(format!("base url {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(root)
            .extend(segments);
        Ok(url)
    }

    fn jobs_url(&self, segments: &[&str]) -> JesResult<Url> {
        self.endpoint(&RESTJOBS, segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        explorer_trace!("{} {}", method, url);
        let builder = self.client.request(method, url).header(CSRF_HEADER, "true");
        match &self.user {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> JesResult<Response> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let message = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => JesError::Auth {
                profile: self.profile.clone(),
            },
            StatusCode::NOT_FOUND => JesError::NotFound(url),
            _ => JesError::Http {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(&self, builder: RequestBuilder) -> JesResult<T> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|err| JesError::Decode(err.to_string()))
    }
}

#[async_trait::async_trait]
impl JesApi for ZosmfJesApi {
    async fn get_jobs_by_parameters(&self, params: &JobQueryParams) -> JesResult<Vec<Job>> {
        let mut url = self.jobs_url(&[])?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in [
                ("owner", &params.owner),
                ("prefix", &params.prefix),
                ("status", &params.status),
            ] {
                if let Some(value) = value {
                    query.append_pair(key, value);
                }
            }
            query.append_pair("exec-data", "Y");
        }
        let jobs: Vec<Job> = self.json(self.request(Method::GET, url)).await?;
        explorer_debug!("{} returned {} jobs", self.profile, jobs.len());
        Ok(jobs)
    }

    async fn get_job(&self, job_id: &str) -> JesResult<Job> {
        let mut url = self.jobs_url(&[])?;
        url.query_pairs_mut()
            .append_pair("owner", "*")
            .append_pair("jobid", job_id)
            .append_pair("exec-data", "Y");
        let jobs: Vec<Job> = self.json(self.request(Method::GET, url)).await?;
        jobs.into_iter()
            .next()
            .ok_or_else(|| JesError::NotFound(job_id.to_string()))
    }

    async fn get_spool_files(&self, jobname: &str, jobid: &str) -> JesResult<Vec<SpoolFile>> {
        let url = self.jobs_url(&[jobname, jobid, "files"])?;
        self.json(self.request(Method::GET, url)).await
    }

    async fn get_spool_content_by_id(
        &self,
        jobname: &str,
        jobid: &str,
        spool_id: u32,
    ) -> JesResult<String> {
        let id = spool_id.to_string();
        let url = self.jobs_url(&[jobname, jobid, "files", &id, "records"])?;
        self.send(self.request(Method::GET, url))
            .await?
            .text()
            .await
            .map_err(|err| JesError::Decode(err.to_string()))
    }

    async fn download_single_spool(
        &self,
        spool: &SpoolFile,
        options: &SpoolDownload,
    ) -> JesResult<Bytes> {
        let (Some(jobname), Some(jobid)) = (spool.jobname.as_deref(), spool.jobid.as_deref())
        else {
            return Err(JesError::Unsupported("downloading a spool file without its job"));
        };
        let Some(id) = spool.id else {
            return Err(JesError::NotFound(format!(
                "spool file {} has no id",
                spool.unique_name()
            )));
        };
        let id = id.to_string();
        let mut url = self.jobs_url(&[jobname, jobid, "files", &id, "records"])?;
        if options.binary {
            url.query_pairs_mut().append_pair("mode", "binary");
        } else if let Some(encoding) = &options.encoding {
            url.query_pairs_mut().append_pair("fileEncoding", encoding);
        }

        let response = self.send(self.request(Method::GET, url)).await?;
        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.map_err(map_reqwest_error)?);
        }
        Ok(body.freeze())
    }

    async fn cancel_job(&self, job: &Job) -> JesResult<bool> {
        let url = self.jobs_url(&[&job.jobname, &job.jobid])?;
        let feedback: JobFeedback = self
            .json(self.request(Method::PUT, url).json(&JobActionRequest {
                request: "cancel",
                version: "2.0",
            }))
            .await?;
        Ok(feedback.status == 0)
    }

    async fn delete_job(&self, jobname: &str, jobid: &str) -> JesResult<()> {
        let url = self.jobs_url(&[jobname, jobid])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn issue_mvs_command(&self, command: &str) -> JesResult<String> {
        let url = self.endpoint(&RESTCONSOLES, &[&self.console_name])?;
        let response: ConsoleResponse = self
            .json(
                self.request(Method::PUT, url)
                    .json(&ConsoleRequest { cmd: command }),
            )
            .await?;
        Ok(response.cmd_response)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> JesError {
    if err.is_timeout() {
        return JesError::Timeout;
    }
    if err.is_decode() {
        return JesError::Decode(err.to_string());
    }
    JesError::Network(err.to_string())
}
