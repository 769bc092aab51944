use tonic_build::manual::{Builder, Method, Service};

// ============================================================================
// gRPC service glue
// ============================================================================
//
// Message types are hand-written prost structs in src/pb/. Only the service
// traits, servers and clients are generated here, so no protoc is needed.
//
// Generated files land in OUT_DIR as `<package>.<Service>.rs`.
//
// ============================================================================

const CODEC: &str = "tonic_prost::ProstCodec";

fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(input)
        .output_type(output)
        .codec_path(CODEC)
        .build()
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=migrations");

    let order_service = Service::builder()
        .name("OrderService")
        .package("order")
        .method(unary(
            "post_order",
            "PostOrder",
            "super::PostOrderRequest",
            "super::PostOrderResponse",
        ))
        .method(unary(
            "get_orders_by_account_id",
            "GetOrdersByAccountID",
            "super::GetOrdersByAccountIdRequest",
            "super::GetOrdersByAccountIdResponse",
        ))
        .build();

    let account_service = Service::builder()
        .name("AccountService")
        .package("account")
        .method(unary(
            "get_account",
            "GetAccount",
            "super::GetAccountRequest",
            "super::GetAccountResponse",
        ))
        .build();

    let catalog_service = Service::builder()
        .name("CatalogService")
        .package("catalog")
        .method(unary(
            "get_products",
            "GetProducts",
            "super::GetProductsRequest",
            "super::GetProductsResponse",
        ))
        .build();

    // Server + client for the service this crate owns.
    Builder::new().compile(&[order_service]);

    // Collaborators are only ever called, never served.
    Builder::new()
        .build_server(false)
        .compile(&[account_service, catalog_service]);
}
