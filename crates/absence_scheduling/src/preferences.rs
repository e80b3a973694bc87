//! School preferences of a substitute, grouped by district.
//!
//! The preferences page fetches three things separately: the organizations
//! the substitute belongs to, each organization's location groups, and the
//! substitute's flat list of location preferences. [`make_districts`] joins
//! them into a `district -> group -> school` tree and [`group_districts`]
//! splits that tree into the favorites and hidden lists the page renders.

use std::collections::{HashMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::deserialize_id;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Favorite,
    Hidden,
    #[default]
    Default,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct School {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub preference: Preference,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchoolGroup {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub schools: Vec<School>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct District {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub org_user_id: String,
    pub school_groups: Vec<SchoolGroup>,
}

impl District {
    pub fn school_count(&self) -> usize {
        self.school_groups.iter().map(|g| g.schools.len()).sum()
    }
}

/// Organization membership of the substitute.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrgInfo {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub org_user_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct Location {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct LocationGroup {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub locations: Vec<Location>,
}

/// Location groups belonging to one organization.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrgLocationGroups {
    #[serde(deserialize_with = "deserialize_id")]
    pub org_id: String,
    #[serde(default)]
    pub groups: Vec<LocationGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationPreference {
    #[serde(deserialize_with = "deserialize_id")]
    pub location_id: String,
    pub preference_id: Preference,
}

/// The two lists shown on the preferences page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GroupedDistricts {
    pub favorites: Vec<District>,
    pub hidden: Vec<District>,
}

impl GroupedDistricts {
    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty() && self.hidden.is_empty()
    }
}

/// Join organizations, their location groups and the substitute's
/// preferences into one tree.
///
/// Schools absent from `preferences` are tagged [`Preference::Default`]; a
/// school listed as both favorite and hidden counts as a favorite.
/// Organizations without a location group entry are left out.
pub fn make_districts(
    orgs: &[OrgInfo],
    location_groups: &[OrgLocationGroups],
    preferences: &[LocationPreference],
) -> Vec<District> {
    let favorites = locations_tagged(preferences, Preference::Favorite);
    let hidden = locations_tagged(preferences, Preference::Hidden);
    let preference_of = |location_id: &str| {
        if favorites.contains(location_id) {
            Preference::Favorite
        } else if hidden.contains(location_id) {
            Preference::Hidden
        } else {
            Preference::Default
        }
    };

    let mut groups_by_org: HashMap<&str, &OrgLocationGroups> = HashMap::new();
    for entry in location_groups {
        groups_by_org.entry(entry.org_id.as_str()).or_insert(entry);
    }

    orgs.iter()
        .filter_map(|org| {
            let Some(entry) = groups_by_org.get(org.id.as_str()) else {
                tracing::debug!(org_id = %org.id, "no location groups for organization; skipping");
                return None;
            };
            let school_groups = entry
                .groups
                .iter()
                .map(|group| SchoolGroup {
                    id: group.id.clone(),
                    name: group.name.clone(),
                    schools: group
                        .locations
                        .iter()
                        .map(|location| School {
                            id: location.id.clone(),
                            name: location.name.clone(),
                            preference: preference_of(&location.id),
                        })
                        .collect(),
                })
                .collect();
            Some(District {
                id: org.id.clone(),
                name: org.name.clone(),
                org_user_id: org.org_user_id.clone(),
                school_groups,
            })
        })
        .collect()
}

fn locations_tagged(preferences: &[LocationPreference], wanted: Preference) -> HashSet<&str> {
    preferences
        .iter()
        .filter(|p| p.preference_id == wanted)
        .map(|p| p.location_id.as_str())
        .collect()
}

/// Split districts into a favorites tree and a hidden tree.
///
/// Default schools appear in neither. Groups and districts left without
/// schools are dropped rather than kept as empty shells.
pub fn group_districts(districts: &[District]) -> GroupedDistricts {
    let grouped = GroupedDistricts {
        favorites: retain_preference(districts, Preference::Favorite),
        hidden: retain_preference(districts, Preference::Hidden),
    };
    tracing::trace!(
        favorites = grouped.favorites.iter().map(District::school_count).sum::<usize>(),
        hidden = grouped.hidden.iter().map(District::school_count).sum::<usize>(),
        "grouped district preferences"
    );
    grouped
}

fn retain_preference(districts: &[District], preference: Preference) -> Vec<District> {
    districts
        .iter()
        .filter_map(|district| {
            let school_groups: Vec<SchoolGroup> = district
                .school_groups
                .iter()
                .filter_map(|group| {
                    let schools: Vec<School> = group
                        .schools
                        .iter()
                        .filter(|school| school.preference == preference)
                        .cloned()
                        .collect();
                    (!schools.is_empty()).then(|| SchoolGroup {
                        id: group.id.clone(),
                        name: group.name.clone(),
                        schools,
                    })
                })
                .collect();
            (!school_groups.is_empty()).then(|| District {
                id: district.id.clone(),
                name: district.name.clone(),
                org_user_id: district.org_user_id.clone(),
                school_groups,
            })
        })
        .collect()
}

/// Merge a favorites tree and a hidden tree back into one, matching
/// districts and then groups by id. Inverse of [`group_districts`] up to
/// ordering.
pub fn join_grouped_districts(grouped: &GroupedDistricts) -> Vec<District> {
    let mut joined = grouped.favorites.clone();
    for district in &grouped.hidden {
        match joined.iter_mut().find(|d| d.id == district.id) {
            Some(existing) => merge_groups(&mut existing.school_groups, &district.school_groups),
            None => joined.push(district.clone()),
        }
    }
    joined
}

fn merge_groups(into: &mut Vec<SchoolGroup>, from: &[SchoolGroup]) {
    for group in from {
        match into.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => existing.schools.extend(group.schools.iter().cloned()),
            None => into.push(group.clone()),
        }
    }
}
