//! Typed commands of [`AiClient`].
//!
//! Every command returns `Ok(Some(..))` with the decoded reply in immediate mode. In pipelined
//! mode it returns `Ok(None)` once the command is queued, the raw reply is then collected with
//! [`AiClient::receive`].
use deadpool::managed::Manager;
use redisai_types::datatype::{DataType, TensorContentType};
use redisai_types::device::{Backend, Device};
use redisai_types::model::Model;
use redisai_types::reply::Reply;
use redisai_types::script::Script;
use redisai_types::tensor::{Tensor, TensorData};
use std::collections::HashMap;

use crate::args::{self, owned, tensor_data};
use crate::builders::{DagExecuteParams, ModelStoreParams, ScriptExecuteParams, ScriptStoreParams};
use crate::client::AiClient;
use crate::conn::Connection;
use crate::dag::Dag;
use crate::error::RedisAiError;
use crate::reply;

fn status(step: &'static str, reply: Option<Reply>) -> Result<Option<()>, RedisAiError> {
    reply.map(|reply| reply::parse_status(step, reply)).transpose()
}

impl<M> AiClient<M>
where
    M: Manager<Error = RedisAiError>,
    M::Type: Connection,
{
    /// AI.TENSORSET with values or a raw blob.
    ///
    /// `data` may be a `Vec` or slice of any supported element type. `Vec<u8>` is sent as a
    /// blob, `Vec<isize>` and `Vec<usize>` are sent as INT64 values and `u32` and `u64`
    /// elements are rejected.
    #[tracing::instrument(skip(self, data))]
    pub async fn tensor_set<D, E>(
        &mut self,
        key: &str,
        dtype: DataType,
        shape: &[usize],
        data: D,
    ) -> Result<Option<()>, RedisAiError>
    where
        D: TryInto<TensorData, Error = E>,
        RedisAiError: From<E>,
    {
        let data = tensor_data(data)?;
        let command = args::tensor_set(key, dtype, shape, Some(&data))?;
        status("AI.TENSORSET", self.dispatch(command).await?)
    }

    /// AI.TENSORSET without data, allocating a tensor of the given shape
    #[tracing::instrument(skip(self))]
    pub async fn tensor_set_meta(
        &mut self,
        key: &str,
        dtype: DataType,
        shape: &[usize],
    ) -> Result<Option<()>, RedisAiError> {
        let command = args::tensor_set(key, dtype, shape, None)?;
        status("AI.TENSORSET", self.dispatch(command).await?)
    }

    #[tracing::instrument(skip(self, tensor))]
    pub async fn tensor_set_from_tensor(
        &mut self,
        key: &str,
        tensor: &Tensor,
    ) -> Result<Option<()>, RedisAiError> {
        let command = args::tensor_set(key, tensor.dtype, &tensor.shape, tensor.data.as_ref())?;
        status("AI.TENSORSET", self.dispatch(command).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn tensor_get(
        &mut self,
        key: &str,
        content_type: TensorContentType,
    ) -> Result<Option<Tensor>, RedisAiError> {
        self.dispatch(args::tensor_get(key, content_type))
            .await?
            .map(|reply| reply::parse_tensor_reply(reply, content_type))
            .transpose()
    }

    pub async fn tensor_get_values(&mut self, key: &str) -> Result<Option<Tensor>, RedisAiError> {
        self.tensor_get(key, TensorContentType::Values).await
    }

    pub async fn tensor_get_meta(&mut self, key: &str) -> Result<Option<Tensor>, RedisAiError> {
        self.tensor_get(key, TensorContentType::Meta).await
    }

    pub async fn tensor_get_blob(&mut self, key: &str) -> Result<Option<Tensor>, RedisAiError> {
        self.tensor_get(key, TensorContentType::Blob).await
    }

    #[tracing::instrument(skip(self, params), fields(key = %params.key, backend = %params.backend))]
    pub async fn model_store(
        &mut self,
        params: &ModelStoreParams,
    ) -> Result<Option<()>, RedisAiError> {
        let command = args::model_store(params)?;
        status("AI.MODELSTORE", self.dispatch(command).await?)
    }

    /// AI.MODELSTORE from a model record, which needs a backend, a device and a blob
    pub async fn model_store_from_model(
        &mut self,
        key: &str,
        model: &Model,
    ) -> Result<Option<()>, RedisAiError> {
        let params = ModelStoreParams::from_model(key, model)?;
        self.model_store(&params).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn model_get(&mut self, key: &str) -> Result<Option<Model>, RedisAiError> {
        self.dispatch(args::model_get(key))
            .await?
            .map(reply::parse_model_reply)
            .transpose()
    }

    #[tracing::instrument(skip(self))]
    pub async fn model_del(&mut self, key: &str) -> Result<Option<()>, RedisAiError> {
        status("AI.MODELDEL", self.dispatch(args::model_del(key)).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn model_execute(
        &mut self,
        key: &str,
        inputs: &[&str],
        outputs: &[&str],
        timeout: Option<u64>,
    ) -> Result<Option<()>, RedisAiError> {
        let command = args::model_execute(key, &owned(inputs), &owned(outputs), timeout);
        status("AI.MODELEXECUTE", self.dispatch(command).await?)
    }

    /// Deprecated AI.MODELRUN, kept for servers older than AI.MODELEXECUTE
    #[tracing::instrument(skip(self))]
    pub async fn model_run(
        &mut self,
        key: &str,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Result<Option<()>, RedisAiError> {
        let command = args::model_run(key, &owned(inputs), &owned(outputs));
        status("AI.MODELRUN", self.dispatch(command).await?)
    }

    #[tracing::instrument(skip(self, params), fields(key = %params.key))]
    pub async fn script_store(
        &mut self,
        params: &ScriptStoreParams,
    ) -> Result<Option<()>, RedisAiError> {
        status(
            "AI.SCRIPTSTORE",
            self.dispatch(args::script_store(params)).await?,
        )
    }

    /// Deprecated AI.SCRIPTSET
    #[tracing::instrument(skip(self, source))]
    pub async fn script_set(
        &mut self,
        key: &str,
        device: Device,
        tag: Option<&str>,
        source: &str,
    ) -> Result<Option<()>, RedisAiError> {
        let command = args::script_set(key, device, tag, source);
        status("AI.SCRIPTSET", self.dispatch(command).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn script_get(&mut self, key: &str) -> Result<Option<Script>, RedisAiError> {
        self.dispatch(args::script_get(key))
            .await?
            .map(reply::parse_script_reply)
            .transpose()
    }

    #[tracing::instrument(skip(self))]
    pub async fn script_del(&mut self, key: &str) -> Result<Option<()>, RedisAiError> {
        status("AI.SCRIPTDEL", self.dispatch(args::script_del(key)).await?)
    }

    #[tracing::instrument(
        skip(self, params),
        fields(key = %params.key, function = %params.function)
    )]
    pub async fn script_execute(
        &mut self,
        params: &ScriptExecuteParams,
    ) -> Result<Option<()>, RedisAiError> {
        status(
            "AI.SCRIPTEXECUTE",
            self.dispatch(args::script_execute(params)).await?,
        )
    }

    /// Deprecated AI.SCRIPTRUN
    #[tracing::instrument(skip(self))]
    pub async fn script_run(
        &mut self,
        key: &str,
        function: &str,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Result<Option<()>, RedisAiError> {
        let command = args::script_run(key, function, &owned(inputs), &owned(outputs));
        status("AI.SCRIPTRUN", self.dispatch(command).await?)
    }

    /// AI.CONFIG LOADBACKEND
    #[tracing::instrument(skip(self))]
    pub async fn load_backend(
        &mut self,
        backend: Backend,
        path: &str,
    ) -> Result<Option<()>, RedisAiError> {
        status(
            "AI.CONFIG",
            self.dispatch(args::load_backend(backend, path)).await?,
        )
    }

    /// AI.CONFIG BACKENDSPATH
    #[tracing::instrument(skip(self))]
    pub async fn set_backends_path(&mut self, path: &str) -> Result<Option<()>, RedisAiError> {
        status("AI.CONFIG", self.dispatch(args::backends_path(path)).await?)
    }

    /// Runtime statistics of a model or script
    #[tracing::instrument(skip(self))]
    pub async fn info(
        &mut self,
        key: &str,
    ) -> Result<Option<HashMap<String, String>>, RedisAiError> {
        self.dispatch(args::info(key))
            .await?
            .map(reply::parse_info_reply)
            .transpose()
    }

    #[tracing::instrument(skip(self))]
    pub async fn reset_stat(&mut self, key: &str) -> Result<Option<()>, RedisAiError> {
        status("AI.INFO", self.dispatch(args::reset_stat(key)).await?)
    }

    async fn dispatch_dag(
        &mut self,
        command: args::Command,
        dag: &Dag,
    ) -> Result<Option<Vec<Reply>>, RedisAiError> {
        self.dispatch(command)
            .await?
            .map(|reply| dag.parse_reply(reply))
            .transpose()
    }

    /// Run every command of the DAG as one AI.DAGRUN. The result holds one reply per command
    #[tracing::instrument(skip(self, dag), fields(commands = dag.len()))]
    pub async fn dag_run(
        &mut self,
        load: &[&str],
        persist: &[&str],
        dag: &Dag,
    ) -> Result<Option<Vec<Reply>>, RedisAiError> {
        let command = args::dag_run(&owned(load), &owned(persist), dag, false)?;
        self.dispatch_dag(command, dag).await
    }

    #[tracing::instrument(skip(self, dag), fields(commands = dag.len()))]
    pub async fn dag_run_ro(
        &mut self,
        load: &[&str],
        dag: &Dag,
    ) -> Result<Option<Vec<Reply>>, RedisAiError> {
        let command = args::dag_run(&owned(load), &[], dag, true)?;
        self.dispatch_dag(command, dag).await
    }

    #[tracing::instrument(skip(self, params, dag), fields(commands = dag.len()))]
    pub async fn dag_execute(
        &mut self,
        params: &DagExecuteParams,
        dag: &Dag,
    ) -> Result<Option<Vec<Reply>>, RedisAiError> {
        let command = args::dag_execute(params, dag, false)?;
        self.dispatch_dag(command, dag).await
    }

    #[tracing::instrument(skip(self, params, dag), fields(commands = dag.len()))]
    pub async fn dag_execute_ro(
        &mut self,
        params: &DagExecuteParams,
        dag: &Dag,
    ) -> Result<Option<Vec<Reply>>, RedisAiError> {
        let command = args::dag_execute(params, dag, true)?;
        self.dispatch_dag(command, dag).await
    }
}
