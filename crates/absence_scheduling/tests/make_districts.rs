use absence_scheduling::preferences::{
    LocationPreference, OrgInfo, OrgLocationGroups, Preference, group_districts, make_districts,
};
use serde_json::json;

fn fixtures() -> (Vec<OrgInfo>, Vec<OrgLocationGroups>, Vec<LocationPreference>) {
    let orgs = json!([
        {"id": 1001, "name": "Maple Valley SD", "orgUserId": 55},
        {"id": "1002", "name": "Cedar County Schools", "orgUserId": "77"},
        {"id": "1003", "name": "No Groups Academy", "orgUserId": "88"}
    ]);
    let groups = json!([
        {"orgId": "1001", "groups": [
            {"id": "10", "name": "Elementary", "locations": [
                {"id": "501", "name": "Adams Elementary"},
                {"id": "502", "name": "Brook Elementary"}
            ]},
            {"id": "11", "name": "High", "locations": [
                {"id": "503", "name": "Central High"}
            ]}
        ]},
        {"orgId": 1002, "groups": [
            {"id": "20", "name": "Middle", "locations": [
                {"id": 601, "name": "Dale Middle"}
            ]}
        ]}
    ]);
    let preferences = json!([
        {"locationId": "501", "preferenceId": "favorite"},
        {"locationId": "503", "preferenceId": "hidden"},
        {"locationId": 601, "preferenceId": "favorite"},
        {"locationId": "999", "preferenceId": "hidden"}
    ]);
    (
        serde_json::from_value(orgs).expect("orgs"),
        serde_json::from_value(groups).expect("groups"),
        serde_json::from_value(preferences).expect("preferences"),
    )
}

#[test]
fn query_results_join_into_districts() {
    let (orgs, groups, preferences) = fixtures();
    let districts = make_districts(&orgs, &groups, &preferences);

    let ids: Vec<&str> = districts.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["1001", "1002"]);
    assert_eq!(districts[0].org_user_id, "55");
    assert_eq!(districts[0].school_count(), 3);

    let maple: Vec<(&str, Preference)> = districts[0]
        .school_groups
        .iter()
        .flat_map(|g| g.schools.iter())
        .map(|s| (s.id.as_str(), s.preference))
        .collect();
    assert_eq!(
        maple,
        vec![
            ("501", Preference::Favorite),
            ("502", Preference::Default),
            ("503", Preference::Hidden),
        ]
    );
}

#[test]
fn joined_districts_group_for_display() {
    let (orgs, groups, preferences) = fixtures();
    let grouped = group_districts(&make_districts(&orgs, &groups, &preferences));

    let favorites: Vec<&str> = grouped.favorites.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(favorites, vec!["Maple Valley SD", "Cedar County Schools"]);
    assert_eq!(grouped.favorites[0].school_groups.len(), 1);
    assert_eq!(grouped.favorites[0].school_groups[0].name, "Elementary");

    assert_eq!(grouped.hidden.len(), 1);
    assert_eq!(grouped.hidden[0].school_groups[0].schools[0].name, "Central High");
}

#[test]
fn districts_serialize_in_camel_case() {
    let (orgs, groups, preferences) = fixtures();
    let districts = make_districts(&orgs, &groups, &preferences);
    let value = serde_json::to_value(&districts[1]).expect("serialize");
    assert_eq!(
        value,
        json!({
            "id": "1002",
            "name": "Cedar County Schools",
            "orgUserId": "77",
            "schoolGroups": [{
                "id": "20",
                "name": "Middle",
                "schools": [{"id": "601", "name": "Dale Middle", "preference": "favorite"}]
            }]
        })
    );
}
