//! The production route table.
//!
//! ```text
//! /                          ApplicationHandler.index
//! /<version>/compute/...     ComputeHandler
//! /<version>/storage/...     StorageHandler
//! /<version>/loadbalancer/...LoadBalancerHandler
//! /<version>/dns/...         DNSHandler
//! ```

use crate::routing::{
    Endpoint, EndpointGroup, HandlerRef, Member, RouteTable, Rule, RuleTemplate, Submount,
};

pub const APPLICATION_HANDLER: &str = "ApplicationHandler";
pub const COMPUTE_HANDLER: &str = "ComputeHandler";
pub const STORAGE_HANDLER: &str = "StorageHandler";
pub const LOADBALANCER_HANDLER: &str = "LoadBalancerHandler";
pub const DNS_HANDLER: &str = "DNSHandler";

fn providers_list_rule() -> Member {
    Rule::new("/providers", "providers").into()
}

fn provider_info_rule() -> Member {
    Rule::new("/providers/<string:provider_name>", "provider_info").into()
}

fn extra_method_rule() -> Member {
    Rule::new("/<string:provider>/<string:method_name>", "invoke_method")
        .methods(["POST"])
        .into()
}

/// `GET /<provider>/$objects` dispatching to `list_$objects`.
pub fn list_objects_rule_template() -> RuleTemplate {
    RuleTemplate::new(vec![Rule::new("/<string:provider>/$objects", "invoke_method")
        .with_default("method_name", "list_$objects")])
}

/// A rule whose libcloud operation is carried in the `method_name` default.
fn op(pattern: &str, endpoint: &str, method: &str, method_name: &str) -> Member {
    Rule::new(pattern, endpoint)
        .methods([method])
        .with_default("method_name", method_name)
        .into()
}

pub fn compute_urls() -> EndpointGroup {
    let list = list_objects_rule_template();
    EndpointGroup::new(
        "/compute",
        HandlerRef::new(COMPUTE_HANDLER),
        vec![
            providers_list_rule(),
            provider_info_rule(),
            extra_method_rule(),
            list.with("objects", "nodes").into(),
            list.with("objects", "images").into(),
            list.with("objects", "sizes").into(),
            list.with("objects", "locations").into(),
            op("/<string:provider>/nodes", "create_node", "POST", "create_node"),
            op(
                "/<string:provider>/nodes/<string:node_id>/reboot",
                "reboot_node",
                "POST",
                "reboot_node",
            ),
            op(
                "/<string:provider>/nodes/<string:node_id>",
                "destroy_node",
                "DELETE",
                "destroy_node",
            ),
        ],
    )
}

pub fn storage_urls() -> EndpointGroup {
    let list = list_objects_rule_template();
    let container = "/<string:provider>/containers/<string:container_name>";
    let object = format!("{container}/objects/<string:object_name>");
    EndpointGroup::new(
        "/storage",
        HandlerRef::new(STORAGE_HANDLER),
        vec![
            providers_list_rule(),
            list.with("objects", "containers").into(),
            op(container, "get_container", "GET", "get_container"),
            op("/<string:provider>/containers", "create_container", "POST", "create_container"),
            op(container, "delete_container", "DELETE", "delete_container"),
            op(
                &format!("{container}/objects"),
                "extract_params_and_invoke",
                "GET",
                "list_container_objects",
            ),
            op(
                &format!("{object}/metadata"),
                "extract_params_and_invoke",
                "GET",
                "get_object",
            ),
            op(&object, "download_object", "GET", "download_object_as_stream"),
            op(&object, "upload_object", "POST", "upload_object_as_stream"),
        ],
    )
}

pub fn loadbalancer_urls() -> EndpointGroup {
    let list = list_objects_rule_template();
    let balancer = "/<string:provider>/balancers/<string:loadbalancer_id>";
    EndpointGroup::new(
        "/loadbalancer",
        HandlerRef::new(LOADBALANCER_HANDLER),
        vec![
            providers_list_rule(),
            provider_info_rule(),
            extra_method_rule(),
            list.with("objects", "protocols").into(),
            list.with("objects", "balancers").into(),
            op(
                "/<string:provider>/algorithms",
                "invoke_method",
                "GET",
                "list_supported_algorithms",
            ),
            op("/<string:provider>/balancers", "create_balancer", "POST", "create_balancer"),
            op(balancer, "destroy_balancer", "DELETE", "destroy_balancer"),
            op(balancer, "patch_request_and_invoke", "PUT", "update_balancer"),
            op(
                "/<string:provider>/balancers/<string:balancer_id>",
                "get_balancer",
                "GET",
                "get_balancer",
            ),
            op(
                &format!("{balancer}/members"),
                "patch_request_and_invoke",
                "GET",
                "balancer_list_members",
            ),
            op(
                &format!("{balancer}/members"),
                "patch_request_and_invoke",
                "POST",
                "balancer_attach_member",
            ),
            op(
                &format!("{balancer}/members/<string:member_id>"),
                "detach_member",
                "DELETE",
                "balancer_detach_member",
            ),
        ],
    )
}

pub fn dns_urls() -> EndpointGroup {
    let list = list_objects_rule_template();
    let zone = "/<string:provider>/zones/<zone_id>";
    let record = "/<string:provider>/zones/<string:zone_id>/records/<string:record_id>";
    EndpointGroup::new(
        "/dns",
        HandlerRef::new(DNS_HANDLER),
        vec![
            providers_list_rule(),
            provider_info_rule(),
            extra_method_rule(),
            list.with("objects", "zones").into(),
            op(
                "/<string:provider>/zones/<string:zone_id>/records",
                "extract_zone_id_and_invoke",
                "GET",
                "list_records",
            ),
            op("/<string:provider>/zones", "create_zone", "POST", "create_zone"),
            op(zone, "extract_zone_id_and_invoke", "PUT", "update_zone"),
            op(zone, "delete_zone", "DELETE", "delete_zone"),
            op(
                "/<string:provider>/zones/<zone_id>/records/<string:record_id>",
                "extract_zone_record_and_invoke",
                "GET",
                "get_record",
            ),
            op(
                &format!("{zone}/records"),
                "create_record",
                "POST",
                "create_record",
            ),
            op(record, "extract_zone_record_and_invoke", "PUT", "update_record"),
            op(record, "delete_record", "DELETE", "delete_record"),
        ],
    )
}

/// The full table: the index route plus every group under `/<api_version>`.
pub fn urls(api_version: &str) -> RouteTable {
    RouteTable::new()
        .root(
            Rule::new(
                "/",
                Endpoint::Bound {
                    handler: HandlerRef::new(APPLICATION_HANDLER),
                    method: "index".to_string(),
                },
            )
            .methods(["GET"]),
        )
        .mount(Submount::new(
            format!("/{api_version}"),
            vec![compute_urls(), storage_urls(), loadbalancer_urls(), dns_urls()],
        ))
}
