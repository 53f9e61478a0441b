//! End-to-end migrations over a temporary working directory.

mod common;

use serde_json::json;

use azmigrate::{Address, MergeError, MigrateError, Plan};
use common::{migration, states, ResourceBuilder, TestHarness};

const NSG_ID: &str =
    "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Network/networkSecurityGroups/nsg";

const NETWORK_TF: &str = r#"resource "azurerm_resource_group" "main" {
  name     = "rg"
  location = "westeurope"
}
"#;

const SECURITY_TF: &str = r#"# network security
resource "azapi_resource" "nsg" {
  type      = "Microsoft.Network/networkSecurityGroups@2023-04-01"
  name      = var.nsg_name
  location  = "westeurope"
  parent_id = azurerm_resource_group.main.id

  security_rule {
    name     = "http"
    priority = var.http_priority
  }

  security_rule {
    name     = "https"
    priority = 110
  }
}
"#;

const USAGE_TF: &str = r#"output "nsg_id" {
  value = azapi_resource.nsg.id
}

resource "azurerm_subnet_network_security_group_association" "app" {
  subnet_id                 = azurerm_subnet.app.id
  network_security_group_id = "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Network/networkSecurityGroups/nsg"
}
"#;

fn harness() -> TestHarness {
    TestHarness::with_files(&[
        ("network.tf", NETWORK_TF),
        ("security.tf", SECURITY_TF),
        ("usage.tf", USAGE_TF),
        ("broken.tf", "resource \"azapi_resource\" {"),
    ])
}

fn nsg_candidate() -> ResourceBuilder {
    ResourceBuilder::new("azurerm_network_security_group", "nsg")
        .attr("name", "\"nsg\"")
        .attr("location", "\"eastus\"")
        .attr("resource_group_name", "\"rg\"")
        .block("security_rule", &[("name", "\"http\""), ("priority", "100")])
        .block("security_rule", &[("name", "\"https\""), ("priority", "120")])
}

fn rule(name: &str, priority: u32) -> serde_json::Value {
    json!({ "name": name, "priority": priority })
}

fn nsg_before() -> serde_json::Value {
    json!({
        "type": "Microsoft.Network/networkSecurityGroups@2023-04-01",
        "name": "nsg",
        "location": "westeurope",
        "parent_id": "/subscriptions/0000/resourceGroups/rg",
        "security_rule": [rule("http", 100), rule("https", 110)]
    })
}

fn nsg_after() -> serde_json::Value {
    json!({
        "name": "nsg",
        "location": "eastus",
        "resource_group_name": "rg",
        "security_rule": [rule("http", 100), rule("https", 120)]
    })
}

fn nsg_states() -> azmigrate::StatePair {
    states(nsg_before(), nsg_after())
}

#[test]
fn test_migration_rewrites_declaration_and_dependents() {
    let harness = harness();
    let reconciler = harness.reconciler();
    let nsg = migration(("azapi_resource", "nsg"), &nsg_candidate())
        .with_resource_id(NSG_ID)
        .with_states(nsg_states());

    let outcome = reconciler.migrate(&nsg).unwrap();

    assert!(outcome.found);
    assert_eq!(outcome.rewritten_documents, 1);

    let security = harness.read("security.tf");
    assert!(security.starts_with("# network security\nresource \"azurerm_network_security_group\" \"nsg\" {"));
    assert!(security.contains("name      = var.nsg_name"));
    assert!(security.contains("location  = \"eastus\""));
    assert!(security.contains("resource_group_name = \"rg\""));
    assert!(
        security.find("resource_group_name") < security.find("security_rule"),
        "new attributes belong above nested blocks"
    );
    assert!(security.contains("priority = var.http_priority"));
    assert!(security.contains("priority = 120"));
    assert!(!security.contains("parent_id"));
    assert!(!security.contains("azapi_resource"));

    let usage = harness.read("usage.tf");
    assert!(usage.contains("value = azurerm_network_security_group.nsg.id"));
    assert!(usage.contains("network_security_group_id = azurerm_network_security_group.nsg.id"));
    assert!(usage.contains("subnet_id                 = azurerm_subnet.app.id"));

    assert_eq!(harness.read("network.tf"), NETWORK_TF);
    assert_eq!(harness.read("broken.tf"), "resource \"azapi_resource\" {");
}

#[test]
fn test_repeated_migration_changes_nothing() {
    let harness = harness();
    let reconciler = harness.reconciler();
    let nsg = migration(("azapi_resource", "nsg"), &nsg_candidate())
        .with_resource_id(NSG_ID)
        .with_states(nsg_states());

    reconciler.migrate(&nsg).unwrap();
    let after_first = harness.contents();

    let outcome = reconciler.migrate(&nsg).unwrap();

    assert!(!outcome.found);
    assert_eq!(outcome.rewritten_documents, 0);
    assert_eq!(harness.contents(), after_first);
}

#[test]
fn test_merging_into_migrated_declaration_is_stable() {
    let harness = harness();
    let reconciler = harness.reconciler();
    reconciler
        .migrate(
            &migration(("azapi_resource", "nsg"), &nsg_candidate()).with_states(nsg_states()),
        )
        .unwrap();
    let after_first = harness.contents();

    let again = migration(("azurerm_network_security_group", "nsg"), &nsg_candidate())
        .with_states(nsg_states());
    let outcome = reconciler.migrate(&again).unwrap();

    assert!(outcome.found);
    assert_eq!(harness.contents(), after_first);
}

#[test]
fn test_only_owning_document_is_written() {
    let harness = harness();
    harness.write(
        "extra.tf",
        "resource \"azapi_resource\" \"other\" {\n  name = \"other\"\n}\n",
    );
    let before = harness.contents();

    let replaced = harness
        .working_set()
        .replace_block(&Address::resource("azapi_resource", "other"), None)
        .unwrap();

    assert!(replaced);
    for ((name, old), (_, new)) in before.iter().zip(harness.contents()) {
        if name == "extra.tf" {
            assert!(!new.contains("azapi_resource"));
        } else {
            assert_eq!(old, &new, "{} must not change", name);
        }
    }
}

#[test]
fn test_plan_supplies_states() {
    let harness = harness();
    let plan = Plan::from_json(
        &json!({
            "resource_changes": [{
                "address": "azapi_resource.nsg",
                "change": {
                    "actions": ["update"],
                    "before": nsg_before(),
                    "after": nsg_after()
                }
            }]
        })
        .to_string(),
    )
    .unwrap();
    let address = Address::resource("azapi_resource", "nsg");
    let nsg = migration(("azapi_resource", "nsg"), &nsg_candidate())
        .with_states(plan.states_for(&address).cloned().unwrap());

    harness.reconciler().migrate(&nsg).unwrap();

    assert!(harness.read("security.tf").contains("priority = var.http_priority"));
}

#[test]
fn test_divergence_leaves_files_untouched() {
    let harness = harness();
    let before = harness.contents();
    let nsg = migration(("azapi_resource", "nsg"), &nsg_candidate()).with_states(states(
        json!({ "security_rule": [rule("http", 100)] }),
        json!({ "security_rule": [rule("http", 100), rule("https", 120)] }),
    ));

    let err = harness.reconciler().migrate_all(&[nsg]).unwrap_err();

    assert!(matches!(
        err,
        MigrateError::Merge(MergeError::StructuralDivergence { blocks: 2, before: 1, after: 2, .. })
    ));
    assert!(err.is_fatal());
    assert_eq!(harness.contents(), before);
}
