//! Test fixtures - composed documents used across tests.

/// A custom object with two fields and a validation rule
pub const ACCOUNT_OBJECT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomObject xmlns="http://soap.sforce.com/2006/04/metadata">
    <label>Account</label>
    <fields>
        <fullName>Rating__c</fullName>
        <label>Rating</label>
        <type>Text</type>
    </fields>
    <fields>
        <fullName>Tier__c</fullName>
        <label>Tier</label>
        <type>Picklist</type>
    </fields>
    <validationRules>
        <fullName>Needs_Rating</fullName>
        <active>true</active>
    </validationRules>
</CustomObject>
"#;

/// A label set with two entries
pub const LABELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomLabels xmlns="http://soap.sforce.com/2006/04/metadata">
    <labels>
        <fullName>Greeting</fullName>
        <value>Hello</value>
    </labels>
    <labels>
        <fullName>Farewell</fullName>
        <value>Bye</value>
    </labels>
</CustomLabels>
"#;

/// A workflow whose children are not addressable on their own
pub const WORKFLOW: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Workflow xmlns="http://soap.sforce.com/2006/04/metadata">
    <alerts>
        <fullName>Notify</fullName>
        <description>Tell someone</description>
    </alerts>
</Workflow>
"#;

pub const APEX_CLASS_META: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ApexClass xmlns="http://soap.sforce.com/2006/04/metadata">
    <apiVersion>60.0</apiVersion>
    <status>Active</status>
</ApexClass>
"#;

/// Registry overlay declaring a `Catalog` type whose `items` decompose into
/// one file each under an `items/` folder
pub const CATALOG_REGISTRY: &str = r#"{
  "types": {
    "catalog": {
      "id": "catalog",
      "name": "Catalog",
      "directoryName": "catalogs",
      "suffix": "catalog",
      "strictDirectoryName": true,
      "children": {
        "types": {
          "item": {
            "id": "item",
            "name": "Item",
            "directoryName": "items",
            "suffix": "item",
            "uniqueIdElement": "name",
            "xmlElementName": "items"
          }
        },
        "suffixes": { "item": "item" },
        "directories": { "items": "item" }
      },
      "strategies": {
        "adapter": "decomposed",
        "transformer": "decomposed",
        "decomposition": "folderPerType"
      }
    }
  }
}"#;
