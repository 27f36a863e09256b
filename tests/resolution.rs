//! Resolution against the production route table.

use std::collections::BTreeSet;

use cloud_rest::api::urls::{
    list_objects_rule_template, APPLICATION_HANDLER, COMPUTE_HANDLER, DNS_HANDLER,
    LOADBALANCER_HANDLER, STORAGE_HANDLER,
};
use cloud_rest::api::urls;
use cloud_rest::routing::{HandlerRef, ParamMap, Resolution, RouteMap};

mod common;

use common::{matched, production_map};

fn params(pairs: &[(&str, &str)]) -> ParamMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_list_providers() {
    let dispatch = matched(production_map().resolve("GET", "/v1/compute/providers"));
    assert_eq!(dispatch.handler, HandlerRef::new(COMPUTE_HANDLER));
    assert_eq!(dispatch.method_name, "providers");
    assert!(dispatch.params.is_empty());
}

#[test]
fn test_create_container() {
    let dispatch = matched(production_map().resolve("POST", "/v1/storage/aws/containers"));
    assert_eq!(dispatch.handler, HandlerRef::new(STORAGE_HANDLER));
    assert_eq!(dispatch.method_name, "create_container");
    assert_eq!(dispatch.params["provider"], "aws");
}

#[test]
fn test_get_record() {
    let dispatch = matched(
        production_map().resolve("GET", "/v1/dns/route53/zones/Z123/records/rec1"),
    );
    assert_eq!(dispatch.handler, HandlerRef::new(DNS_HANDLER));
    assert_eq!(dispatch.method_name, "get_record");
    assert_eq!(dispatch.endpoint, "extract_zone_record_and_invoke");
    assert_eq!(
        dispatch.params,
        params(&[
            ("method_name", "get_record"),
            ("provider", "route53"),
            ("record_id", "rec1"),
            ("zone_id", "Z123"),
        ])
    );
}

#[test]
fn test_detach_member() {
    let dispatch = matched(
        production_map().resolve("DELETE", "/v1/loadbalancer/elb/balancers/lb1/members/m1"),
    );
    assert_eq!(dispatch.handler, HandlerRef::new(LOADBALANCER_HANDLER));
    assert_eq!(dispatch.method_name, "balancer_detach_member");
    assert_eq!(dispatch.endpoint, "detach_member");
    assert_eq!(dispatch.params["loadbalancer_id"], "lb1");
    assert_eq!(dispatch.params["member_id"], "m1");
    assert_eq!(dispatch.params["provider"], "elb");
}

#[test]
fn test_unknown_path() {
    assert_eq!(
        production_map().resolve("GET", "/v1/unknown/foo"),
        Resolution::NotFound
    );
}

#[test]
fn test_index() {
    let dispatch = matched(production_map().resolve("GET", "/"));
    assert_eq!(dispatch.handler, HandlerRef::new(APPLICATION_HANDLER));
    assert_eq!(dispatch.method_name, "index");
}

#[test]
fn test_list_template_instances() {
    let map = production_map();
    for (path, method_name) in [
        ("/v1/compute/ec2/nodes", "list_nodes"),
        ("/v1/compute/ec2/images", "list_images"),
        ("/v1/compute/ec2/sizes", "list_sizes"),
        ("/v1/compute/ec2/locations", "list_locations"),
        ("/v1/storage/s3/containers", "list_containers"),
        ("/v1/loadbalancer/elb/protocols", "list_protocols"),
        ("/v1/loadbalancer/elb/balancers", "list_balancers"),
        ("/v1/dns/route53/zones", "list_zones"),
    ] {
        let dispatch = matched(map.resolve("GET", path));
        assert_eq!(dispatch.method_name, method_name, "{path}");
        assert_eq!(dispatch.endpoint, "invoke_method", "{path}");
    }
}

#[test]
fn test_template_round_trip() {
    let template = list_objects_rule_template();
    let nodes = template.with("objects", "nodes").instantiate().unwrap();
    assert_eq!(nodes[0].pattern, "/<string:provider>/nodes");
    assert_eq!(nodes[0].defaults["method_name"], "list_nodes");

    let containers = template.with("objects", "containers").instantiate().unwrap();
    assert_eq!(containers[0].pattern, "/<string:provider>/containers");
    assert_eq!(containers[0].defaults["method_name"], "list_containers");
}

#[test]
fn test_same_path_different_methods() {
    let map = production_map();
    let path = "/v1/storage/s3/containers/logs";
    assert_eq!(matched(map.resolve("GET", path)).method_name, "get_container");
    assert_eq!(matched(map.resolve("DELETE", path)).method_name, "delete_container");
    assert_eq!(
        map.resolve("PUT", path),
        Resolution::MethodNotAllowed {
            allowed: BTreeSet::from(["DELETE".into(), "GET".into(), "HEAD".into()]),
        }
    );
}

#[test]
fn test_variable_names_follow_the_matched_rule() {
    let map = production_map();
    let get = matched(map.resolve("GET", "/v1/loadbalancer/elb/balancers/lb1"));
    assert_eq!(get.params["balancer_id"], "lb1");

    let delete = matched(map.resolve("DELETE", "/v1/loadbalancer/elb/balancers/lb1"));
    assert_eq!(delete.params["loadbalancer_id"], "lb1");
    assert_eq!(delete.method_name, "destroy_balancer");
}

#[test]
fn test_extra_method_invocation() {
    let map = production_map();
    let dispatch = matched(map.resolve("POST", "/v1/compute/ec2/ex_create_tags"));
    assert_eq!(dispatch.endpoint, "invoke_method");
    assert_eq!(dispatch.method_name, "ex_create_tags");

    // A literal route shadows the extra-method route.
    let dispatch = matched(map.resolve("POST", "/v1/compute/ec2/nodes"));
    assert_eq!(dispatch.method_name, "create_node");
}

#[test]
fn test_method_not_allowed_on_nodes() {
    assert_eq!(
        production_map().resolve("DELETE", "/v1/compute/ec2/nodes"),
        Resolution::MethodNotAllowed {
            allowed: BTreeSet::from(["GET".into(), "HEAD".into(), "POST".into()]),
        }
    );
}

#[test]
fn test_method_not_allowed_on_zone() {
    assert_eq!(
        production_map().resolve("GET", "/v1/dns/route53/zones/Z1"),
        Resolution::MethodNotAllowed {
            allowed: BTreeSet::from(["DELETE".into(), "PUT".into()]),
        }
    );
}

#[test]
fn test_version_prefix_is_required() {
    let map = production_map();
    assert_eq!(map.resolve("GET", "/compute/providers"), Resolution::NotFound);
    assert_eq!(map.resolve("GET", "/v2/compute/providers"), Resolution::NotFound);
    assert_eq!(map.resolve("GET", "/v1/compute//providers"), Resolution::NotFound);
    assert!(matches!(
        map.resolve("GET", "/v1/compute/providers/"),
        Resolution::Matched(_)
    ));
}

#[test]
fn test_resolution_is_deterministic() {
    let first = production_map();
    let second = RouteMap::build(&urls("v1")).unwrap();

    let a: Vec<_> = first.rules().iter().map(|r| r.rule().clone()).collect();
    let b: Vec<_> = second.rules().iter().map(|r| r.rule().clone()).collect();
    assert_eq!(a, b);

    for (method, path) in [
        ("GET", "/v1/dns/route53/zones/Z123/records/rec1"),
        ("PUT", "/v1/storage/s3/containers/logs"),
        ("GET", "/nowhere"),
    ] {
        let expected = first.resolve(method, path);
        for _ in 0..3 {
            assert_eq!(first.resolve(method, path), expected);
            assert_eq!(second.resolve(method, path), expected);
        }
    }
}
