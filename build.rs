use tonic_build::manual::{Builder, Method, Service};

fn method(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(input)
        .output_type(output)
        .codec_path("tonic::codec::ProstCodec")
        .build()
}

// stub types must be paths, hence `proto::Empty` for the unit message
fn main() {
    let coordinator = Service::builder()
        .name("Coordinator")
        .package("mr")
        .method(method("request_task", "RequestTask", "crate::mr::rpc::proto::Empty", "crate::mr::rpc::proto::TaskReply"))
        .method(method("report_done", "ReportDone", "crate::mr::rpc::proto::ReportDoneRequest", "crate::mr::rpc::proto::Empty"))
        .method(method("is_job_complete", "IsJobComplete", "crate::mr::rpc::proto::Empty", "crate::mr::rpc::proto::JobStatus"))
        .build();

    Builder::new().compile(&[coordinator]);
    println!("cargo:rerun-if-changed=build.rs");
}
