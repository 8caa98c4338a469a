use super::ensure_parent;
use crate::error::{require_dir, Error};
use crate::fuzzy;
use crate::merge::list_subfolders;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{error, info};

/// Customer folder name to its immediate subfolder names, both sorted.
pub type CustomerInventory = BTreeMap<String, Vec<String>>;

#[derive(Debug, Serialize)]
struct CustomerRow<'a> {
    #[serde(rename = "Customer")]
    customer: &'a str,
    #[serde(rename = "Subfolder")]
    subfolder: &'a str,
}

#[derive(Debug, Serialize)]
struct MergeGroupRow {
    #[serde(rename = "Group Representative")]
    representative: String,
    #[serde(rename = "Customer Variations")]
    variations: String,
}

/// Immediate subfolders of `root` are customers; their own subfolders are listed.
pub fn inventory_customers(root: &Path) -> Result<CustomerInventory, Error> {
    require_dir(root)?;
    let mut customers = CustomerInventory::new();
    for customer in list_subfolders(root)? {
        let subfolders = match list_subfolders(&root.join(&customer)) {
            Ok(subs) => subs,
            Err(e) => {
                error!("Error listing {}: {}", customer, e);
                Vec::new()
            }
        };
        customers.insert(customer, subfolders);
    }
    Ok(customers)
}

/// `Customer,Subfolder` rows; a customer without subfolders gets one blank row.
pub fn write_customer_csv(data: &CustomerInventory, output: &Path) -> Result<(), Error> {
    ensure_parent(output)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(output)?;
    writer.write_record(["Customer", "Subfolder"])?;
    for (customer, subfolders) in data {
        if subfolders.is_empty() {
            writer.serialize(CustomerRow { customer, subfolder: "" })?;
        }
        for sub in subfolders {
            writer.serialize(CustomerRow { customer, subfolder: sub })?;
        }
    }
    writer.flush()?;
    info!("Inventory CSV saved to: {}", output.display());
    Ok(())
}

pub fn group_customer_names(data: &CustomerInventory, threshold: f64) -> Vec<Vec<String>> {
    let names: Vec<&String> = data.keys().collect();
    fuzzy::group(&names, threshold)
}

/// `Group Representative,Customer Variations` rows, one per group.
pub fn write_merge_csv(groups: &[Vec<String>], output: &Path) -> Result<(), Error> {
    ensure_parent(output)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(output)?;
    writer.write_record(["Group Representative", "Customer Variations"])?;
    let mut sorted: Vec<&Vec<String>> = groups.iter().filter(|g| !g.is_empty()).collect();
    sorted.sort_by(|a, b| a[0].cmp(&b[0]));
    for group in sorted {
        let mut variations = group.clone();
        variations.sort();
        writer.serialize(MergeGroupRow {
            representative: group[0].clone(),
            variations: variations.join(", "),
        })?;
    }
    writer.flush()?;
    info!("Merged inventory CSV saved to: {}", output.display());
    Ok(())
}
