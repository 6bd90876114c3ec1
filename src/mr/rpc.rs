use std::path::{Path, PathBuf};

use anyhow::anyhow;
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;
use tonic::transport::{Channel, Endpoint, Uri};
use tower::service_fn;

use super::{TaskId, TaskKind, task::Assignment};

pub mod proto {
    /// Empty request/response body, encoded as a zero-length message.
    pub type Empty = ();

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum JobType {
        Retry = 0,
        Map = 1,
        Reduce = 2,
        AllDone = 3,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum TaskPhase {
        Map = 0,
        Reduce = 1,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TaskReply {
        #[prost(enumeration = "JobType", tag = "1")]
        pub job_type: i32,
        #[prost(string, tag = "2")]
        pub map_file: ::prost::alloc::string::String,
        #[prost(uint64, tag = "3")]
        pub map_index: u64,
        #[prost(uint64, tag = "4")]
        pub reduce_index: u64,
        #[prost(uint64, tag = "5")]
        pub n_reduce: u64,
        #[prost(uint64, tag = "6")]
        pub n_map: u64,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ReportDoneRequest {
        #[prost(enumeration = "TaskPhase", tag = "1")]
        pub phase: i32,
        #[prost(uint64, tag = "2")]
        pub index: u64,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct JobStatus {
        #[prost(bool, tag = "1")]
        pub complete: bool,
    }

    include!(concat!(env!("OUT_DIR"), "/mr.Coordinator.rs"));
}

pub type CoordinatorClient = proto::coordinator_client::CoordinatorClient<Channel>;

#[link(name = "c")]
unsafe extern "C" {
    fn geteuid() -> u32;
}

/// Per-user default socket the coordinator listens on.
pub fn coordinator_sock() -> PathBuf {
    PathBuf::from(format!("/tmp/824-mr-{}", unsafe { geteuid() }))
}

pub async fn connect(sock: &Path) -> Result<CoordinatorClient, anyhow::Error> {
    let sock = sock.to_path_buf();
    // the URI is ignored, every connection goes through the unix socket
    let channel = Endpoint::from_static("http://[::1]:50051")
        .connect_with_connector(service_fn(move |_: Uri| {
            let sock = sock.clone();
            async move {
                let stream = UnixStream::connect(sock).await?;
                Ok::<_, std::io::Error>(TokioIo::new(stream))
            }
        }))
        .await?;
    Ok(CoordinatorClient::new(channel))
}

impl From<TaskKind> for proto::TaskPhase {
    fn from(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Map => proto::TaskPhase::Map,
            TaskKind::Reduce => proto::TaskPhase::Reduce,
        }
    }
}

impl From<proto::TaskPhase> for TaskKind {
    fn from(phase: proto::TaskPhase) -> Self {
        match phase {
            proto::TaskPhase::Map => TaskKind::Map,
            proto::TaskPhase::Reduce => TaskKind::Reduce,
        }
    }
}

impl From<TaskId> for proto::ReportDoneRequest {
    fn from(task: TaskId) -> Self {
        proto::ReportDoneRequest {
            phase: proto::TaskPhase::from(task.kind) as i32,
            index: task.index as u64,
        }
    }
}

impl TryFrom<proto::ReportDoneRequest> for TaskId {
    type Error = anyhow::Error;

    fn try_from(req: proto::ReportDoneRequest) -> Result<Self, Self::Error> {
        let phase = proto::TaskPhase::try_from(req.phase)
            .map_err(|_| anyhow!("unknown task phase {}", req.phase))?;
        Ok(TaskId::new(phase.into(), req.index as usize))
    }
}

impl From<Assignment> for proto::TaskReply {
    fn from(assignment: Assignment) -> Self {
        let reply = proto::TaskReply::default();
        match assignment {
            Assignment::Map { file, index, n_reduce } => proto::TaskReply {
                job_type: proto::JobType::Map as i32,
                map_file: file,
                map_index: index as u64,
                n_reduce: n_reduce as u64,
                ..reply
            },
            Assignment::Reduce { index, n_map } => proto::TaskReply {
                job_type: proto::JobType::Reduce as i32,
                reduce_index: index as u64,
                n_map: n_map as u64,
                ..reply
            },
            Assignment::Retry => proto::TaskReply { job_type: proto::JobType::Retry as i32, ..reply },
            Assignment::AllDone => proto::TaskReply { job_type: proto::JobType::AllDone as i32, ..reply },
        }
    }
}

impl TryFrom<proto::TaskReply> for Assignment {
    type Error = anyhow::Error;

    fn try_from(reply: proto::TaskReply) -> Result<Self, Self::Error> {
        let job_type = proto::JobType::try_from(reply.job_type)
            .map_err(|_| anyhow!("unknown job type {}", reply.job_type))?;
        Ok(match job_type {
            proto::JobType::Map => Assignment::Map {
                file: reply.map_file,
                index: reply.map_index as usize,
                n_reduce: reply.n_reduce as usize,
            },
            proto::JobType::Reduce => Assignment::Reduce {
                index: reply.reduce_index as usize,
                n_map: reply.n_map as usize,
            },
            proto::JobType::Retry => Assignment::Retry,
            proto::JobType::AllDone => Assignment::AllDone,
        })
    }
}
