// tests/repository.rs

mod common;

use common::*;
use git_census::{Error, FeatureSet, RangeSpec};

#[test]
fn resolves_refs_once_and_passes_ids_through() {
    let (mut repo, calls) = linear_history(FeatureSet::empty()).into_repository();

    assert_eq!(repo.resolve_ref("master").unwrap(), id(5));
    assert_eq!(repo.resolve_ref("master").unwrap(), id(5));
    assert_eq!(calls.resolves.get(), 1);

    assert_eq!(repo.resolve_ref(&id(3)).unwrap(), id(3));
    assert_eq!(calls.resolves.get(), 1);

    assert!(matches!(repo.resolve_ref("nope"), Err(Error::RefNotFound(name)) if name == "nope"));
}

#[test]
fn range_bounds_are_resolved() {
    let (mut repo, _) = linear_history(FeatureSet::empty()).into_repository();

    let range = repo.resolve(&RangeSpec::parse("master").unwrap()).unwrap();
    assert_eq!(range.from, None);
    assert_eq!(range.to, id(5));

    let range = repo.resolve(&RangeSpec::from((id(2).as_str(), "master"))).unwrap();
    assert_eq!(range.from, Some(id(2)));
}

#[test]
fn repeated_query_is_served_from_cache() {
    let (mut repo, calls) = linear_history(FeatureSet::empty()).into_repository();

    let first = repo.commits(RangeSpec::Ref("master".into())).unwrap();
    let second = repo.commits(RangeSpec::Ref("master".into())).unwrap();

    assert_eq!(calls.fetch_count(), 1);
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(ids(&first), vec![id(5), id(4), id(3), id(2), id(1)]);
}

#[test]
fn extending_range_downwards_fetches_only_the_gap() {
    let (mut repo, calls) = linear_history(FeatureSet::empty()).into_repository();

    let recent = repo.commits(RangeSpec::from((id(3).as_str(), "master"))).unwrap();
    assert_eq!(ids(&recent), vec![id(5), id(4)]);
    assert_eq!(calls.fetch_count(), 1);

    let wider = repo.commits(RangeSpec::from((id(1).as_str(), "master"))).unwrap();
    assert_eq!(calls.fetch_count(), 2);

    let (mut fresh, _) = linear_history(FeatureSet::empty()).into_repository();
    let direct = fresh.commits(RangeSpec::from((id(1).as_str(), "master"))).unwrap();
    assert_eq!(ids(&wider), ids(&direct));
    assert_eq!(ids(&wider), vec![id(5), id(4), id(3), id(2)]);
}

#[test]
fn extending_range_upwards_does_not_duplicate_boundary() {
    let (mut repo, calls) = linear_history(FeatureSet::empty()).into_repository();

    let older = repo.commits(RangeSpec::from((id(1).as_str(), id(3).as_str()))).unwrap();
    assert_eq!(ids(&older), vec![id(3), id(2)]);

    let all = repo.commits(RangeSpec::from((id(1).as_str(), "master"))).unwrap();
    assert_eq!(calls.fetch_count(), 2);
    // the second fetch starts above the cached part
    assert_eq!(calls.fetches.borrow()[1], (Some(id(3)), id(5)));
    assert_eq!(ids(&all), vec![id(5), id(4), id(3), id(2)]);
}

#[test]
fn sub_range_of_cached_history_needs_no_fetch() {
    let (mut repo, calls) = linear_history(FeatureSet::empty()).into_repository();
    repo.commits(RangeSpec::Ref("master".into())).unwrap();

    let middle = repo.commits(RangeSpec::from((id(2).as_str(), id(4).as_str()))).unwrap();
    assert_eq!(ids(&middle), vec![id(4), id(3)]);
    assert_eq!(calls.fetch_count(), 1);
}

#[test]
fn empty_range() {
    let (mut repo, calls) = linear_history(FeatureSet::empty()).into_repository();
    let commits = repo.commits(RangeSpec::from((id(5).as_str(), "master"))).unwrap();
    assert!(commits.is_empty());
    assert_eq!(calls.fetch_count(), 0);
}

#[test]
fn merge_commits_are_walked_once() {
    let (mut repo, calls) = merge_history(FeatureSet::empty()).into_repository();

    let all = repo.commits(RangeSpec::Ref("master".into())).unwrap();
    assert_eq!(ids(&all), vec![id(5), id(4), id(3), id(2), id(1)]);

    // everything reachable from master but not from the feature branch
    let merged = repo.commits(RangeSpec::parse("feature..master").unwrap()).unwrap();
    assert_eq!(ids(&merged), vec![id(5), id(4), id(2)]);
    assert_eq!(calls.fetch_count(), 1);

    let (mut fresh, _) = merge_history(FeatureSet::empty()).into_repository();
    let direct = fresh.commits(RangeSpec::parse("feature..master").unwrap()).unwrap();
    assert_eq!(ids(&direct), ids(&merged));
}

#[test]
fn residual_fetch_below_a_merge() {
    let (mut repo, calls) = merge_history(FeatureSet::empty()).into_repository();

    // caches 5 and 4 with 4 as the boundary
    repo.commits(RangeSpec::from((id(4).as_str(), "master"))).unwrap();
    let all = repo.commits(RangeSpec::Ref("master".into())).unwrap();

    assert_eq!(ids(&all), vec![id(5), id(4), id(3), id(2), id(1)]);
    // both parents of the merge come from a single fetch below it
    assert_eq!(calls.fetch_count(), 2);
    assert_eq!(calls.fetches.borrow()[1], (None, id(4)));

    let again = repo.commits(RangeSpec::Ref("master".into())).unwrap();
    assert_eq!(ids(&again), ids(&all));
    assert_eq!(calls.fetch_count(), 2);
}

#[test]
fn uncached_lower_bound_excludes_its_ancestors() {
    let (mut repo, calls) = forked_history(FeatureSet::empty()).into_repository();
    repo.commits(RangeSpec::Ref("master".into())).unwrap();

    let warm = repo.commits(RangeSpec::parse("side..master").unwrap()).unwrap();
    assert_eq!(calls.fetch_count(), 2);

    let (mut fresh, _) = forked_history(FeatureSet::empty()).into_repository();
    let direct = fresh.commits(RangeSpec::parse("side..master").unwrap()).unwrap();
    assert_eq!(ids(&direct), vec![id(3), id(2)]);
    assert_eq!(ids(&warm), ids(&direct));

    // the lower bound is cached now
    let again = repo.commits(RangeSpec::parse("side..master").unwrap()).unwrap();
    assert_eq!(ids(&again), ids(&direct));
    assert_eq!(calls.fetch_count(), 2);
}

#[test]
fn downward_extension_fetches_below_the_cached_part() {
    let (mut repo, calls) = linear_history(FeatureSet::empty()).into_repository();
    repo.commits(RangeSpec::from((id(3).as_str(), "master"))).unwrap();
    repo.commits(RangeSpec::from((id(1).as_str(), "master"))).unwrap();

    assert_eq!(calls.fetches.borrow()[1], (Some(id(1)), id(3)));
}

#[test]
fn collections_are_newest_first() {
    let (mut repo, _) = merge_history(FeatureSet::empty()).into_repository();
    repo.commits(RangeSpec::Ref("feature".into())).unwrap();
    let commits = repo.commits(RangeSpec::Ref("master".into())).unwrap();

    let dates: Vec<_> = commits.iter().map(|c| c.committed_date()).collect();
    assert!(dates.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn graph_links_and_actor_cache() {
    let (mut repo, _) = merge_history(FeatureSet::empty()).into_repository();
    repo.commits(RangeSpec::Ref("master".into())).unwrap();

    let root = repo.commit(&id(1)).unwrap();
    let mut children = root.children();
    children.sort();
    assert_eq!(children, vec![id(2), id(3)]);
    assert_eq!(repo.commit(&id(4)).unwrap().parents(), &[id(2), id(3)]);

    let alice = repo.actor("alice@example.com").unwrap();
    assert_eq!(alice.authored_commits().len(), 3);
    assert_eq!(alice.committed_commits().first().unwrap().id(), id(4));
    assert_eq!(repo.cached_commit_count(), 5);
}

#[test]
fn refs_and_metadata() {
    let (mut repo, calls) = merge_history(FeatureSet::empty()).into_repository();

    let branches = repo.branches().unwrap();
    assert_eq!(branches.get("feature"), Some(&id(3)));
    // listed branches resolve without another round trip
    assert_eq!(repo.resolve_ref("feature").unwrap(), id(3));
    assert_eq!(calls.resolves.get(), 0);

    assert_eq!(repo.name().unwrap(), "mock");
    assert_eq!(repo.description().unwrap(), "A scripted history");
    assert_eq!(repo.default_range().unwrap(), RangeSpec::Ref("master".into()));
}

#[test]
fn missing_adapter_operations_report_not_implemented() {
    let (mut repo, _) = linear_history(FeatureSet::empty()).into_repository();
    assert!(matches!(
        repo.tags(),
        Err(Error::NotImplemented { operation: "list_tags", vcs: "mock" })
    ));
}

#[test]
fn lower_bound_commit_is_cached_with_its_actors() {
    let (mut repo, _) = linear_history(FeatureSet::empty()).into_repository();
    let recent = repo.commits(RangeSpec::from((id(3).as_str(), "master"))).unwrap();
    assert!(!recent.contains(&id(3)));

    let alice = repo.actor("alice@example.com").unwrap();
    assert_eq!(ids(&alice.authored_commits()), vec![id(5), id(3)]);
    assert_eq!(recent.authors().authored_commits(Some(alice.id())).len(), 1);
}
