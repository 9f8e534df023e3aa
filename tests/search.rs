use ksp_confignode::{
    CfgError, ConfigNode, NamedObject, Registry, SearchExpr, SearchQuery, SearchTerm, Selected,
    ValueStore,
};
use miette::Result;
use pretty_assertions::assert_eq;

const PARTS: &str = "
PART
{
    name = liquidEngine
    mass = 1.25
    MODULE
    {
        name = ModuleEngines
        thrustPercentage = 100
        PROPELLANT
        {
            name = LiquidFuel
        }
    }
    MODULE
    {
        name = ModuleGimbal
    }
}
PART
{
    name = fuelTank
    mass = 0.5
    RESOURCE
    {
        name = LiquidFuel
    }
    RESOURCE
    {
        name = Oxidizer
    }
}
PART
{
    name = probeCore
    mass = 0.1
    MODULE
    {
        name = ModuleCommand
    }
    RESOURCE
    {
        name = ElectricCharge
    }
}
RESOURCE_DEFINITION
{
    name = LiquidFuel
}
";

fn objects() -> Vec<NamedObject> {
    let root = ConfigNode::from_text(PARTS);
    let registry = Registry::standard();
    root.subnodes().iter().map(|node| registry.load(node)).collect()
}

fn found(query: &SearchQuery, objects: &[NamedObject]) -> Vec<String> {
    query.filter(objects).filter_map(NamedObject::name).collect()
}

#[test]
fn leading_wildcard_ignores_type() -> Result<()> {
    let objects = objects();
    let any_type = SearchTerm::parse("/name:LiquidFuel")?;
    let matched = objects
        .iter()
        .filter(|obj| any_type.matches(*obj))
        .map(|obj| obj.ty().to_string())
        .collect::<Vec<_>>();
    assert_eq!(matched, vec!["RESOURCE_DEFINITION"]);

    let part_only = SearchTerm::parse("PART/name:LiquidFuel")?;
    assert!(!part_only.matches(&objects[3]));

    let through_any_child = SearchTerm::parse("PART//name:LiquidFuel")?;
    let matched = objects
        .iter()
        .filter(|obj| through_any_child.matches(*obj))
        .filter_map(NamedObject::name)
        .collect::<Vec<_>>();
    assert_eq!(matched, vec!["fuelTank"]);
    Ok(())
}

#[test]
fn negation_is_exact_complement() -> Result<()> {
    let objects = objects();
    let terms = [
        "PART/MODULE/name:ModuleEngines",
        "PART/RESOURCE:Oxidizer/",
        "mass:0\\.5",
        "/name:LiquidFuel",
        "PART",
        "",
    ];
    for text in terms {
        let term = SearchTerm::parse(text)?;
        let negated = SearchTerm::parse(&format!("^{term}"))?;
        for obj in &objects {
            assert_eq!(negated.matches(obj), !term.matches(obj), "{text} on {obj}");
        }
    }
    Ok(())
}

#[test]
fn deep_paths() -> Result<()> {
    let objects = objects();
    let term = SearchTerm::parse("PART/MODULE:ModuleEngines/PROPELLANT/name:LiquidFuel")?;
    assert!(term.matches(&objects[0]));
    assert!(!term.matches(&objects[1]));

    let thrust = SearchTerm::parse("PART/MODULE/thrustPercentage")?.select(&objects[0]);
    assert!(matches!(
        thrust.as_slice(),
        [Selected::Value(entry)] if entry.value().as_f64() == Some(100.0)
    ));

    let modules = SearchTerm::parse("PART/MODULE/")?.select(&objects[0]);
    assert_eq!(modules.len(), 2);
    Ok(())
}

#[test]
fn and_of_or_group() -> Result<()> {
    let objects = objects();
    let query = SearchQuery::parse(
        "PART/mass && {PART/RESOURCE/name:Oxidizer || PART/MODULE/name:ModuleCommand}",
        None,
    )?;
    assert_eq!(found(&query, &objects), vec!["fuelTank", "probeCore"]);

    let [SearchExpr::Term(first), SearchExpr::Group(group)] = query.root().items() else {
        panic!("unexpected query shape: {query}");
    };
    assert_eq!(first.to_string(), "PART/mass");
    assert!(matches!(group.items(), [SearchExpr::Or(..)]));
    Ok(())
}

#[test]
fn or_then_and_binds_right() -> Result<()> {
    let objects = objects();
    let query: SearchQuery =
        "PART/name:liquid || PART/RESOURCE/name:LiquidFuel && PART/RESOURCE/name:Electric"
            .parse()?;
    assert_eq!(
        query.to_string(),
        "{{PART/name:liquid} OR {PART/RESOURCE/name:LiquidFuel AND PART/RESOURCE/name:Electric}}"
    );
    assert_eq!(found(&query, &objects), vec!["liquidEngine"]);

    let grouped: SearchQuery =
        "{PART/name:liquid || PART/RESOURCE/name:LiquidFuel} && PART/RESOURCE/name:Electric"
            .parse()?;
    assert!(found(&grouped, &objects).is_empty());
    Ok(())
}

#[test]
fn compiled_matches_built() -> Result<()> {
    let parsed = SearchQuery::parse("a && {b || c}", None)?;

    let mut inner = SearchQuery::new();
    inner.and("b")?.or("c")?;
    let mut built = SearchQuery::new();
    built.and("a")?.and(inner)?;

    assert_eq!(parsed, built);
    Ok(())
}

#[test]
fn multi_line_queries() -> Result<()> {
    let objects = objects();
    let query = SearchQuery::parse(
        "MODULE/name:ModuleEngines\n\r||\r\nRESOURCE/name:Electric",
        Some("PART"),
    )?;
    assert_eq!(found(&query, &objects), vec!["liquidEngine", "probeCore"]);
    Ok(())
}

#[test]
fn root_node_prefix() -> Result<()> {
    let objects = objects();
    let query = SearchQuery::parse("RESOURCE/name:Oxidizer || PART:probe/", Some("PART"))?;
    assert_eq!(
        query.to_string(),
        "{{PART/RESOURCE/name:Oxidizer} OR {PART:probe/}}"
    );
    assert_eq!(found(&query, &objects), vec!["fuelTank", "probeCore"]);
    Ok(())
}

#[test]
fn unbalanced_braces_fail() {
    for text in ["a && {b", "a && b}", "}{", "{{a} || b"] {
        assert!(
            matches!(
                SearchQuery::parse(text, None),
                Err(CfgError::UnbalancedBrackets { .. })
            ),
            "{text}"
        );
    }
}

#[test]
fn malformed_terms_fail() {
    assert!(matches!(
        SearchQuery::parse("a && b:c:d", None),
        Err(CfgError::MalformedSegment { .. })
    ));
    assert!(matches!(
        "PART/name:[".parse::<SearchQuery>(),
        Err(CfgError::InvalidPattern { .. })
    ));
}

#[test]
fn queries_over_raw_nodes() -> Result<()> {
    let root = ConfigNode::from_text(PARTS);
    let query = SearchQuery::parse("RESOURCE/name:LiquidFuel", Some("PART"))?;
    let names = query
        .filter(root.subnodes())
        .filter_map(|node| node.get_value("name", 0).map(|v| v.to_string()))
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["fuelTank"]);
    Ok(())
}
