//! Vendored bindings for the ML-Agents `communicator_objects` protobuf
//! package and its `UnityToExternalProto` gRPC service, restricted to the
//! surface the probe drives: initialization handshake, brain parameters,
//! reset/step commands, actions, and uncompressed observations.
//!
//! Kept in-tree (standard tonic codegen shape) so builds do not require
//! `protoc`. Fields this probe never reads are omitted; protobuf skips
//! unknown tags, so editors remain free to send them.

/// Message framing: every `Exchange` call and reply is one of these.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnityMessageProto {
    #[prost(message, optional, tag = "1")]
    pub header: ::core::option::Option<HeaderProto>,
    #[prost(message, optional, tag = "2")]
    pub unity_output: ::core::option::Option<UnityOutputProto>,
    #[prost(message, optional, tag = "3")]
    pub unity_input: ::core::option::Option<UnityInputProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeaderProto {
    #[prost(int32, tag = "1")]
    pub status: i32,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnityInputProto {
    #[prost(message, optional, tag = "1")]
    pub rl_input: ::core::option::Option<UnityRlInputProto>,
    #[prost(message, optional, tag = "2")]
    pub rl_initialization_input: ::core::option::Option<UnityRlInitializationInputProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnityOutputProto {
    #[prost(message, optional, tag = "1")]
    pub rl_output: ::core::option::Option<UnityRlOutputProto>,
    #[prost(message, optional, tag = "2")]
    pub rl_initialization_output: ::core::option::Option<UnityRlInitializationOutputProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnityRlInitializationInputProto {
    #[prost(int32, tag = "1")]
    pub seed: i32,
    #[prost(string, tag = "2")]
    pub communication_version: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub package_version: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "4")]
    pub capabilities: ::core::option::Option<UnityRlCapabilitiesProto>,
    #[prost(int32, tag = "5")]
    pub num_areas: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnityRlInitializationOutputProto {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub communication_version: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub package_version: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub log_path: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "5")]
    pub brain_parameters: ::prost::alloc::vec::Vec<BrainParametersProto>,
    #[prost(message, optional, tag = "7")]
    pub capabilities: ::core::option::Option<UnityRlCapabilitiesProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnityRlCapabilitiesProto {
    #[prost(bool, tag = "1")]
    pub base_rl_capabilities: bool,
    #[prost(bool, tag = "2")]
    pub concatenated_png_observations: bool,
    #[prost(bool, tag = "3")]
    pub compressed_channel_mapping: bool,
    #[prost(bool, tag = "4")]
    pub hybrid_actions: bool,
    #[prost(bool, tag = "5")]
    pub training_analytics: bool,
    #[prost(bool, tag = "6")]
    pub variable_length_observation: bool,
    #[prost(bool, tag = "7")]
    pub multi_agent_groups: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BrainParametersProto {
    #[prost(string, tag = "7")]
    pub brain_name: ::prost::alloc::string::String,
    #[prost(bool, tag = "8")]
    pub is_training: bool,
    #[prost(message, optional, tag = "9")]
    pub action_spec: ::core::option::Option<ActionSpecProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionSpecProto {
    #[prost(int32, tag = "1")]
    pub num_continuous_actions: i32,
    #[prost(int32, tag = "2")]
    pub num_discrete_actions: i32,
    #[prost(int32, repeated, tag = "3")]
    pub discrete_branch_sizes: ::prost::alloc::vec::Vec<i32>,
    #[prost(string, repeated, tag = "4")]
    pub action_descriptions: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnityRlInputProto {
    #[prost(map = "string, message", tag = "1")]
    pub agent_actions:
        ::std::collections::HashMap<::prost::alloc::string::String, ListAgentActionProto>,
    #[prost(enumeration = "CommandProto", tag = "4")]
    pub command: i32,
    #[prost(bytes = "vec", tag = "5")]
    pub side_channel: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListAgentActionProto {
    #[prost(message, repeated, tag = "1")]
    pub value: ::prost::alloc::vec::Vec<AgentActionProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentActionProto {
    #[prost(float, repeated, tag = "6")]
    pub continuous_actions: ::prost::alloc::vec::Vec<f32>,
    #[prost(int32, repeated, tag = "7")]
    pub discrete_actions: ::prost::alloc::vec::Vec<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnityRlOutputProto {
    #[prost(map = "string, message", tag = "1")]
    pub agent_infos:
        ::std::collections::HashMap<::prost::alloc::string::String, ListAgentInfoProto>,
    #[prost(bytes = "vec", tag = "3")]
    pub side_channel: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListAgentInfoProto {
    #[prost(message, repeated, tag = "1")]
    pub value: ::prost::alloc::vec::Vec<AgentInfoProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentInfoProto {
    #[prost(float, tag = "7")]
    pub reward: f32,
    #[prost(bool, tag = "8")]
    pub done: bool,
    #[prost(bool, tag = "9")]
    pub max_step_reached: bool,
    #[prost(int32, tag = "10")]
    pub id: i32,
    #[prost(bool, repeated, tag = "11")]
    pub action_mask: ::prost::alloc::vec::Vec<bool>,
    #[prost(message, repeated, tag = "13")]
    pub observations: ::prost::alloc::vec::Vec<ObservationProto>,
    #[prost(int32, tag = "14")]
    pub group_id: i32,
    #[prost(float, tag = "15")]
    pub group_reward: f32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ObservationProto {
    #[prost(int32, repeated, tag = "1")]
    pub shape: ::prost::alloc::vec::Vec<i32>,
    #[prost(enumeration = "CompressionTypeProto", tag = "2")]
    pub compression_type: i32,
    #[prost(string, tag = "8")]
    pub name: ::prost::alloc::string::String,
    #[prost(oneof = "observation_proto::ObservationData", tags = "3, 4")]
    pub observation_data: ::core::option::Option<observation_proto::ObservationData>,
}

/// Nested message and enum types in `ObservationProto`.
pub mod observation_proto {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ObservationData {
        #[prost(bytes, tag = "3")]
        CompressedData(::prost::alloc::vec::Vec<u8>),
        #[prost(message, tag = "4")]
        FloatData(super::FloatDataProto),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FloatDataProto {
    #[prost(float, repeated, tag = "1")]
    pub data: ::prost::alloc::vec::Vec<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CommandProto {
    Step = 0,
    Reset = 1,
    Quit = 2,
}

impl CommandProto {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            CommandProto::Step => "STEP",
            CommandProto::Reset => "RESET",
            CommandProto::Quit => "QUIT",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CompressionTypeProto {
    None = 0,
    Png = 1,
}

/// Generated client implementations.
pub mod unity_to_external_proto_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct UnityToExternalProtoClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl UnityToExternalProtoClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> UnityToExternalProtoClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }

        /// One round of the editor conversation: deliver a message, receive
        /// the counterpart's reply.
        pub async fn exchange(
            &mut self,
            request: impl tonic::IntoRequest<super::UnityMessageProto>,
        ) -> std::result::Result<tonic::Response<super::UnityMessageProto>, tonic::Status>
        {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/communicator_objects.UnityToExternalProto/Exchange",
            );
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "communicator_objects.UnityToExternalProto",
                "Exchange",
            ));
            self.inner.unary(req, path, codec).await
        }
    }
}

/// Generated server implementations.
pub mod unity_to_external_proto_server {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;

    /// Generated trait containing gRPC methods that should be implemented for
    /// use with UnityToExternalProtoServer.
    #[async_trait]
    pub trait UnityToExternalProto: Send + Sync + 'static {
        async fn exchange(
            &self,
            request: tonic::Request<super::UnityMessageProto>,
        ) -> std::result::Result<tonic::Response<super::UnityMessageProto>, tonic::Status>;
    }

    #[derive(Debug)]
    pub struct UnityToExternalProtoServer<T: UnityToExternalProto> {
        inner: Arc<T>,
        accept_compression_encodings: EnabledCompressionEncodings,
        send_compression_encodings: EnabledCompressionEncodings,
        max_decoding_message_size: Option<usize>,
        max_encoding_message_size: Option<usize>,
    }

    impl<T: UnityToExternalProto> UnityToExternalProtoServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }

        pub fn from_arc(inner: Arc<T>) -> Self {
            Self {
                inner,
                accept_compression_encodings: Default::default(),
                send_compression_encodings: Default::default(),
                max_decoding_message_size: None,
                max_encoding_message_size: None,
            }
        }
    }

    impl<T, B> tonic::codegen::Service<http::Request<B>> for UnityToExternalProtoServer<T>
    where
        T: UnityToExternalProto,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/communicator_objects.UnityToExternalProto/Exchange" => {
                    #[allow(non_camel_case_types)]
                    struct ExchangeSvc<T: UnityToExternalProto>(pub Arc<T>);
                    impl<T: UnityToExternalProto>
                        tonic::server::UnaryService<super::UnityMessageProto> for ExchangeSvc<T>
                    {
                        type Response = super::UnityMessageProto;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::UnityMessageProto>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { (*inner).exchange(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = Arc::clone(&self.inner);
                    let fut = async move {
                        let method = ExchangeSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            )
                            .apply_max_message_size_config(
                                max_decoding_message_size,
                                max_encoding_message_size,
                            );
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(empty_body())
                        .unwrap())
                }),
            }
        }
    }

    impl<T: UnityToExternalProto> Clone for UnityToExternalProtoServer<T> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
                accept_compression_encodings: self.accept_compression_encodings,
                send_compression_encodings: self.send_compression_encodings,
                max_decoding_message_size: self.max_decoding_message_size,
                max_encoding_message_size: self.max_encoding_message_size,
            }
        }
    }

    impl<T: UnityToExternalProto> tonic::server::NamedService for UnityToExternalProtoServer<T> {
        const NAME: &'static str = "communicator_objects.UnityToExternalProto";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn handshake_reply_roundtrips() {
        let msg = UnityMessageProto {
            header: Some(HeaderProto {
                status: 200,
                message: String::new(),
            }),
            unity_input: Some(UnityInputProto {
                rl_input: None,
                rl_initialization_input: Some(UnityRlInitializationInputProto {
                    seed: 0,
                    communication_version: "1.5.0".into(),
                    package_version: env!("CARGO_PKG_VERSION").into(),
                    capabilities: Some(UnityRlCapabilitiesProto {
                        base_rl_capabilities: true,
                        hybrid_actions: true,
                        ..Default::default()
                    }),
                    num_areas: 1,
                }),
            }),
            unity_output: None,
        };

        let decoded = UnityMessageProto::decode(msg.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, msg);
        let init = decoded.unity_input.unwrap().rl_initialization_input.unwrap();
        assert_eq!(init.communication_version, "1.5.0");
        assert!(init.capabilities.unwrap().base_rl_capabilities);
    }

    #[test]
    fn command_enum_maps_to_wire_values() {
        assert_eq!(CommandProto::Step as i32, 0);
        assert_eq!(CommandProto::Reset as i32, 1);
        assert_eq!(CommandProto::Quit as i32, 2);
        assert_eq!(CommandProto::Quit.as_str_name(), "QUIT");
    }
}
