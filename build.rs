fn main() {
    // Service stubs for the subject catalog. Message types are hand-written
    // prost structs in src/grpc.rs (standard protobuf wire format, no `.proto`).
    let service = tonic_build::manual::Service::builder()
        .name("SubjectService")
        .package("catalog.subject")
        .method(
            tonic_build::manual::Method::builder()
                .name("search")
                .route_name("Search")
                .input_type("crate::grpc::SearchRequest")
                .output_type("crate::grpc::Subject")
                .codec_path("tonic::codec::ProstCodec")
                .server_streaming()
                .build(),
        )
        .method(
            tonic_build::manual::Method::builder()
                .name("add")
                .route_name("Add")
                .input_type("crate::grpc::AddRequest")
                .output_type("crate::grpc::AddResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
