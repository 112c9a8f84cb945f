mod dto;
mod error;
mod ids;
mod requests;
mod status;
mod types;

pub use dto::{TaskDto, TaskRunDto};
pub use error::TaskError;
pub use ids::{parse_run_id, parse_task_id, parse_uuid_field};
pub use requests::{
    CreateArtifactRequest, CreateTaskRequest, CreateTaskRunRequest, UpdateTaskRequest,
    UpdateTaskRunRequest,
};
pub use status::TaskStatus;
pub use types::{newest_first, NewTask, NewTaskRun, Task, TaskRun, TaskRunArtifact};
