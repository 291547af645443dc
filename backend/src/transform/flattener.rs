//! Flatten product rows into parent and variation records.
//!
//! Rows sharing a product name form one group. Each group yields one
//! `variable` parent summarizing every attribute value of the group, followed
//! by one `variation` record per source row.
//!
//! # Architecture
//!
//! ```text
//! Source rows                          Import records
//! ┌───────────────────────────┐       ┌──────────────────────────────────┐
//! │ Shirt  S  Red   SKU1      │       │ variable   ACME-SKU1  M|S Blue|Red│
//! │ Shirt  M  Red   SKU2      │  →    │ variation  SKU1                  │
//! │ Shirt  S  Blue  SKU3      │       │ variation  SKU2      Color=Red   │
//! └───────────────────────────┘       │ variation  SKU3      Size=S      │
//!                                     └──────────────────────────────────┘
//! ```
//!
//! # Variation attributes
//!
//! A variation row only carries a value for a variation attribute when that
//! attribute still tells it apart: among the rows of the group that agree with
//! it on every other variation attribute (a missing value matches anything),
//! fewer distinct values remain than on the parent. Otherwise the cell is blank.

use std::collections::{BTreeSet, HashMap};

use crate::config::{
    DESCRIPTION_COLUMN, IMAGE_COLUMN, SHORT_DESCRIPTION_COLUMN, SKU_SEPARATOR, STOCK_STATUS,
    VARIATION_REGULAR_PRICE,
};
use crate::error::{TransformError, TransformResult};
use crate::models::{
    AttributeCells, AttributeConfig, ColumnRoles, Dataset, ProductRecord, ProductType, SourceRow,
};
use super::clean::{brand_prefix, clean_value, distinct_values, join_values};

/// Parent `attribute_data` flags: enabled, visible in additional info, used for variations.
const ATTRIBUTE_DATA_VISIBLE: &str = "0|1|1";
const ATTRIBUTE_DATA_HIDDEN: &str = "0|0|1";
const ATTRIBUTE_VARIATION_FLAG: &str = "1";

/// Run-wide settings of the flattener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenSettings {
    pub brand: String,
    pub brand_in_title: bool,
    pub sku_in_variation_title: bool,
}

impl FlattenSettings {
    pub fn new(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            brand_in_title: false,
            sku_in_variation_title: false,
        }
    }
}

/// Column indices resolved once per run. Missing columns read as blank.
struct Columns {
    sku: Option<usize>,
    product: Option<usize>,
    category: Option<usize>,
    short_description: Option<usize>,
    description: Option<usize>,
    images: Option<usize>,
    attributes: Vec<Option<usize>>,
}

impl Columns {
    fn resolve(dataset: &Dataset, roles: &ColumnRoles, attributes: &[AttributeConfig]) -> Self {
        Self {
            sku: dataset.column_index(&roles.sku),
            product: dataset.column_index(&roles.product),
            category: dataset.column_index(&roles.category),
            short_description: dataset.column_index(SHORT_DESCRIPTION_COLUMN),
            description: dataset.column_index(DESCRIPTION_COLUMN),
            images: dataset.column_index(IMAGE_COLUMN),
            attributes: attributes.iter().map(|a| dataset.column_index(&a.column)).collect(),
        }
    }
}

fn text_at(row: &SourceRow, index: Option<usize>) -> String {
    index.map(|i| row.get(i).to_text().into_owned()).unwrap_or_default()
}

/// Rows sharing one product name, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductGroup {
    pub name: String,
    pub rows: Vec<usize>,
}

/// Group row indices by product name, in order of first appearance.
///
/// Rows with a blank product name belong to no group.
pub fn group_rows(dataset: &Dataset, product_column: &str) -> Vec<ProductGroup> {
    let Some(index) = dataset.column_index(product_column) else {
        return Vec::new();
    };

    let mut groups: Vec<ProductGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (i, row) in dataset.rows.iter().enumerate() {
        let cell = row.get(index);
        if cell.is_blank() {
            continue;
        }
        let name = cell.to_text().into_owned();
        let pos = *positions.entry(name.clone()).or_insert_with(|| {
            groups.push(ProductGroup { name, rows: Vec::new() });
            groups.len() - 1
        });
        groups[pos].rows.push(i);
    }

    groups
}

/// Flatten the dataset into import records.
///
/// Output is grouped in first-appearance order: parent first, then its
/// variations in source order. Fails only on an empty attribute set.
pub fn flatten(
    dataset: &Dataset,
    roles: &ColumnRoles,
    attributes: &[AttributeConfig],
    settings: &FlattenSettings,
) -> TransformResult<Vec<ProductRecord>> {
    if attributes.is_empty() {
        return Err(TransformError::EmptyAttributeConfiguration);
    }

    let columns = Columns::resolve(dataset, roles, attributes);
    let prefix = brand_prefix(&settings.brand);
    let mut records = Vec::with_capacity(dataset.len());

    for group in group_rows(dataset, &roles.product) {
        let builder = GroupBuilder::new(dataset, &columns, attributes, &group);
        records.push(builder.parent(&prefix, settings));
        records.extend(builder.variations(&prefix, settings));
    }

    Ok(records)
}

/// Per-group working state: cleaned attribute values and the parent value sets.
struct GroupBuilder<'a> {
    dataset: &'a Dataset,
    columns: &'a Columns,
    attributes: &'a [AttributeConfig],
    group: &'a ProductGroup,
    /// `cleaned[r][a]`: cleaned value of attribute `a` on the group's `r`-th row.
    cleaned: Vec<Vec<Option<String>>>,
    /// Distinct values of each attribute over the whole group.
    parent_values: Vec<BTreeSet<String>>,
}

impl<'a> GroupBuilder<'a> {
    fn new(
        dataset: &'a Dataset,
        columns: &'a Columns,
        attributes: &'a [AttributeConfig],
        group: &'a ProductGroup,
    ) -> Self {
        let cleaned: Vec<Vec<Option<String>>> = group
            .rows
            .iter()
            .map(|&r| {
                let row = &dataset.rows[r];
                columns
                    .attributes
                    .iter()
                    .map(|index| index.and_then(|i| clean_value(row.get(i))))
                    .collect()
            })
            .collect();

        let parent_values = (0..attributes.len())
            .map(|a| distinct_values(cleaned.iter().filter_map(|row| row[a].as_deref())))
            .collect();

        Self {
            dataset,
            columns,
            attributes,
            group,
            cleaned,
            parent_values,
        }
    }

    fn first_row(&self) -> &SourceRow {
        &self.dataset.rows[self.group.rows[0]]
    }

    fn parent_sku(&self, prefix: &str) -> String {
        format!("{}{}{}", prefix, SKU_SEPARATOR, text_at(self.first_row(), self.columns.sku))
    }

    fn parent(&self, prefix: &str, settings: &FlattenSettings) -> ProductRecord {
        let first = self.first_row();
        let post_title = if settings.brand_in_title {
            format!("{} {}", settings.brand.trim(), self.group.name)
        } else {
            self.group.name.clone()
        };

        let mut attributes = HashMap::new();
        for (attribute, values) in self.attributes.iter().zip(&self.parent_values) {
            if values.is_empty() {
                continue;
            }
            let data = if attribute.visible_info {
                ATTRIBUTE_DATA_VISIBLE
            } else {
                ATTRIBUTE_DATA_HIDDEN
            };
            attributes.insert(
                attribute.slug.clone(),
                AttributeCells {
                    value: join_values(values),
                    data: data.to_string(),
                    variation: ATTRIBUTE_VARIATION_FLAG.to_string(),
                    ..Default::default()
                },
            );
        }

        ProductRecord {
            product_type: ProductType::Variable,
            post_title,
            sku: self.parent_sku(prefix),
            parent_sku: String::new(),
            regular_price: String::new(),
            stock_status: STOCK_STATUS.to_string(),
            categories: text_at(first, self.columns.category),
            short_description: text_at(first, self.columns.short_description),
            description: text_at(first, self.columns.description),
            images: text_at(first, self.columns.images),
            attributes,
        }
    }

    fn variations(&self, prefix: &str, settings: &FlattenSettings) -> Vec<ProductRecord> {
        let parent_sku = self.parent_sku(prefix);

        self.group
            .rows
            .iter()
            .enumerate()
            .map(|(r, &source)| {
                let row = &self.dataset.rows[source];
                let sku = text_at(row, self.columns.sku);
                let post_title = if settings.sku_in_variation_title && !sku.is_empty() {
                    format!("{} - {}", self.group.name, sku)
                } else {
                    self.group.name.clone()
                };

                let attributes = self
                    .attributes
                    .iter()
                    .enumerate()
                    .map(|(a, attribute)| {
                        let data = self.variation_value(r, a).unwrap_or_default();
                        (attribute.slug.clone(), AttributeCells { data, ..Default::default() })
                    })
                    .collect();

                ProductRecord {
                    product_type: ProductType::Variation,
                    post_title,
                    sku,
                    parent_sku: parent_sku.clone(),
                    regular_price: VARIATION_REGULAR_PRICE.to_string(),
                    stock_status: STOCK_STATUS.to_string(),
                    categories: String::new(),
                    short_description: String::new(),
                    description: String::new(),
                    images: text_at(row, self.columns.images),
                    attributes,
                }
            })
            .collect()
    }

    /// Value of attribute `a` on the group's `r`-th row, when it still discriminates.
    fn variation_value(&self, r: usize, a: usize) -> Option<String> {
        if !self.attributes[a].is_variation {
            return None;
        }
        let own = self.cleaned[r][a].as_ref()?;
        let peers = self.peer_values(r, a);
        if peers.len() < self.parent_values[a].len() {
            Some(own.clone())
        } else {
            None
        }
    }

    /// Distinct values of attribute `a` among the rows matching row `r`
    /// on every other variation attribute.
    fn peer_values(&self, r: usize, a: usize) -> BTreeSet<String> {
        let row = &self.cleaned[r];
        let peers = self.cleaned.iter().filter(|other| {
            self.attributes.iter().enumerate().all(|(b, attribute)| {
                if b == a || !attribute.is_variation {
                    return true;
                }
                match (&row[b], &other[b]) {
                    (Some(mine), Some(theirs)) => mine == theirs,
                    _ => true,
                }
            })
        });
        distinct_values(peers.filter_map(|other| other[a].as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> ColumnRoles {
        ColumnRoles::new("SKU", "Product Name", "Categories")
    }

    fn attribute(column: &str, is_variation: bool, visible_info: bool) -> AttributeConfig {
        AttributeConfig {
            column: column.to_string(),
            slug: column.to_lowercase(),
            distinct_values: Vec::new(),
            is_variation,
            visible_info,
        }
    }

    fn shirts() -> Dataset {
        Dataset::from_text_rows(
            ["Product Name", "Size", "Color", "SKU", "Categories", "Image URL"],
            vec![
                vec!["Shirt", "S", "Red", "SKU1", "Tops", "s1.jpg"],
                vec!["Shirt", "M", "Red", "SKU2", "Tops", "s2.jpg"],
                vec!["Shirt", "S", "Blue", "SKU3", "Tops", "s3.jpg"],
            ],
        )
    }

    fn data<'r>(record: &'r ProductRecord, slug: &str) -> &'r str {
        record.attribute(slug).map(|c| c.data.as_str()).unwrap_or("")
    }

    #[test]
    fn test_worked_example() {
        let attributes = vec![attribute("Size", true, false), attribute("Color", true, true)];
        let records = flatten(&shirts(), &roles(), &attributes, &FlattenSettings::new("Acme")).unwrap();

        assert_eq!(records.len(), 4);
        let parent = &records[0];
        assert_eq!(parent.product_type, ProductType::Variable);
        assert_eq!(parent.sku, "ACME-SKU1");
        assert_eq!(parent.post_title, "Shirt");
        assert_eq!(parent.categories, "Tops");
        assert_eq!(parent.images, "s1.jpg");
        assert_eq!(parent.attribute("size").unwrap().value, "M|S");
        assert_eq!(parent.attribute("color").unwrap().value, "Blue|Red");
        assert_eq!(parent.attribute("size").unwrap().data, "0|0|1");
        assert_eq!(parent.attribute("color").unwrap().data, "0|1|1");
        assert_eq!(parent.attribute("color").unwrap().variation, "1");
        assert_eq!(parent.attribute("color").unwrap().default, "");

        // SKU1 (S, Red): Red rows hold S and M, S rows hold Red and Blue
        assert_eq!(data(&records[1], "size"), "");
        assert_eq!(data(&records[1], "color"), "");
        // SKU2 (M, Red): only M row is Red among M rows
        assert_eq!(data(&records[2], "size"), "");
        assert_eq!(data(&records[2], "color"), "Red");
        // SKU3 (S, Blue): the only Blue row is S
        assert_eq!(data(&records[3], "size"), "S");
        assert_eq!(data(&records[3], "color"), "");
    }

    #[test]
    fn test_variation_base_fields() {
        let attributes = vec![attribute("Size", true, false)];
        let records = flatten(&shirts(), &roles(), &attributes, &FlattenSettings::new("Acme")).unwrap();

        for (variation, sku) in records[1..].iter().zip(["SKU1", "SKU2", "SKU3"]) {
            assert_eq!(variation.product_type, ProductType::Variation);
            assert_eq!(variation.sku, sku);
            assert_eq!(variation.parent_sku, "ACME-SKU1");
            assert_eq!(variation.regular_price, "0");
            assert_eq!(variation.stock_status, "instock");
            assert_eq!(variation.categories, "");
        }
        assert_eq!(records[3].images, "s3.jpg");
    }

    #[test]
    fn test_single_variation_attribute_never_discriminates() {
        let attributes = vec![attribute("Size", true, false)];
        let records = flatten(&shirts(), &roles(), &attributes, &FlattenSettings::new("Acme")).unwrap();

        // No other variation attribute, so every row is a peer and counts match
        assert!(records[1..].iter().all(|r| data(r, "size").is_empty()));
    }

    #[test]
    fn test_non_variation_attribute_never_on_variations() {
        let attributes = vec![attribute("Size", true, false), attribute("Color", false, true)];
        let records = flatten(&shirts(), &roles(), &attributes, &FlattenSettings::new("Acme")).unwrap();

        assert_eq!(records[0].attribute("color").unwrap().value, "Blue|Red");
        assert!(records[1..].iter().all(|r| data(r, "color").is_empty()));
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let ds = Dataset::from_text_rows(
            ["Product Name", "SKU", "Size"],
            vec![
                vec!["Zebra Tee", "Z1", "S"],
                vec!["Alpha Tee", "A1", "M"],
                vec!["Zebra Tee", "Z2", "L"],
                vec!["", "X1", "XL"],
            ],
        );
        let groups = group_rows(&ds, "Product Name");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Zebra Tee");
        assert_eq!(groups[0].rows, vec![0, 2]);
        assert_eq!(groups[1].rows, vec![1]);

        let records = flatten(&ds, &roles(), &[attribute("Size", true, false)], &FlattenSettings::new("b")).unwrap();
        let skus: Vec<_> = records.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["B-Z1", "Z1", "Z2", "B-A1", "A1"]);
    }

    #[test]
    fn test_group_without_values_omits_attribute() {
        let ds = Dataset::from_text_rows(
            ["Product Name", "SKU", "Size", "Color"],
            vec![vec!["Cap", "C1", "", "Red"], vec!["Cap", "C2", " ", "Blue"]],
        );
        let attributes = vec![attribute("Size", true, false), attribute("Color", true, false)];
        let records = flatten(&ds, &roles(), &attributes, &FlattenSettings::new("Acme")).unwrap();

        assert!(records[0].attribute("size").is_none());
        assert_eq!(records[0].attribute("color").unwrap().value, "Blue|Red");
    }

    #[test]
    fn test_missing_values_match_any_peer() {
        let ds = Dataset::from_text_rows(
            ["Product Name", "SKU", "Size", "Color"],
            vec![
                vec!["Cap", "C1", "S", "Red"],
                vec!["Cap", "C2", "M", ""],
                vec!["Cap", "C3", "L", "Blue"],
            ],
        );
        let attributes = vec![attribute("Size", true, false), attribute("Color", true, false)];
        let records = flatten(&ds, &roles(), &attributes, &FlattenSettings::new("Acme")).unwrap();

        // C1 Size peers: Red rows plus the colorless C2 -> {S, M} < {L, M, S}
        assert_eq!(data(&records[1], "size"), "S");
        // C2 has no color, so every row is a Size peer
        assert_eq!(data(&records[2], "size"), "");
        assert_eq!(data(&records[2], "color"), "");
    }

    #[test]
    fn test_values_are_cleaned_and_split() {
        let ds = Dataset::from_text_rows(
            ["Product Name", "SKU", "Fit"],
            vec![vec!["Jeans", "J1", "Slim Fit, Regular"], vec!["Jeans", "J2", "Regular"]],
        );
        let records = flatten(&ds, &roles(), &[attribute("Fit", false, false)], &FlattenSettings::new("Acme")).unwrap();
        assert_eq!(records[0].attribute("fit").unwrap().value, "Regular|SlimFit");
    }

    #[test]
    fn test_title_options() {
        let mut settings = FlattenSettings::new("Acme Co");
        settings.brand_in_title = true;
        settings.sku_in_variation_title = true;

        let records = flatten(&shirts(), &roles(), &[attribute("Size", true, false)], &settings).unwrap();
        assert_eq!(records[0].post_title, "Acme Co Shirt");
        assert_eq!(records[0].sku, "ACMECO-SKU1");
        assert_eq!(records[1].post_title, "Shirt - SKU1");
    }

    #[test]
    fn test_numeric_sku_and_missing_columns() {
        let ds = Dataset::from_text_rows(
            ["Product Name", "SKU", "Size"],
            vec![vec!["Mug", "1001", "S"]],
        );
        let records = flatten(&ds, &roles(), &[attribute("Size", true, false)], &FlattenSettings::new("Acme")).unwrap();
        assert_eq!(records[0].sku, "ACME-1001");
        assert_eq!(records[0].categories, "");
        assert_eq!(records[0].description, "");
        assert_eq!(records[1].images, "");
    }

    #[test]
    fn test_empty_attributes_rejected() {
        let result = flatten(&shirts(), &roles(), &[], &FlattenSettings::new("Acme"));
        assert_eq!(result, Err(TransformError::EmptyAttributeConfiguration));
    }

    #[test]
    fn test_deterministic() {
        let attributes = vec![attribute("Size", true, false), attribute("Color", true, true)];
        let a = flatten(&shirts(), &roles(), &attributes, &FlattenSettings::new("Acme")).unwrap();
        let b = flatten(&shirts(), &roles(), &attributes, &FlattenSettings::new("Acme")).unwrap();
        assert_eq!(a, b);
    }
}
