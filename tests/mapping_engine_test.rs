//! End-to-end mapping engine tests, run against both navigation backends.

mod common;

use common::*;
use xml_mapper::{Direction, MappingError, TypeRegistry};

#[test]
fn test_point_serializes_to_expected_document() {
    for backend in backends() {
        let engine = engine_with(backend);
        let xml = engine.serialize(&Point { x: 3, y: 4 }, "point").unwrap();
        assert_eq!(
            xml, "<point><x>3</x><y>4</y></point>",
            "backend: {}",
            engine.backend_name()
        );
    }
}

#[test]
fn test_point_deserializes_from_literal_document() {
    for backend in backends() {
        let engine = engine_with(backend);
        let point: Point = engine
            .deserialize("<point><x>3</x><y>4</y></point>")
            .unwrap();
        assert_eq!(point, Point { x: 3, y: 4 });
    }
}

#[test]
fn test_missing_required_field() {
    for backend in backends() {
        let engine = engine_with(backend);
        let result = engine.deserialize::<Point>("<point><x>3</x></point>");
        match result {
            Err(MappingError::FieldMissing { field, expression }) => {
                assert_eq!(field, "y");
                assert_eq!(expression, "y");
            }
            other => panic!("Expected FieldMissing, got {other:?}"),
        }
    }
}

#[test]
fn test_malformed_scalar_value() {
    for backend in backends() {
        let engine = engine_with(backend);
        let result = engine.deserialize::<Point>("<point><x>abc</x><y>4</y></point>");
        match result {
            Err(MappingError::ValueFormat { field, value, .. }) => {
                assert_eq!(field, "x");
                assert_eq!(value, "abc");
            }
            other => panic!("Expected ValueFormat, got {other:?}"),
        }
    }
}

#[test]
fn test_unregistered_type_in_each_direction() {
    struct Unmapped;

    for backend in backends() {
        let engine = engine_with(backend);

        match engine.serialize(&Unmapped, "unmapped") {
            Err(MappingError::UnregisteredType { direction, .. }) => {
                assert_eq!(direction, Direction::ToXml)
            }
            other => panic!("Expected UnregisteredType, got {other:?}"),
        }

        match engine.deserialize::<Unmapped>("<unmapped/>") {
            Err(MappingError::UnregisteredType { direction, .. }) => {
                assert_eq!(direction, Direction::FromXml)
            }
            _ => panic!("Expected UnregisteredType"),
        }
    }
}

#[test]
fn test_nested_object_graph_round_trip() {
    for backend in backends() {
        let engine = engine_with(backend);
        let trade = sample_trade();

        let xml = engine.serialize(&trade, "trade").unwrap();
        let restored: Trade = engine.deserialize(&xml).unwrap();
        assert_eq!(restored, trade, "backend: {}", engine.backend_name());
    }
}

#[test]
fn test_collection_order_is_preserved() {
    for backend in backends() {
        let engine = engine_with(backend);
        let mut trade = sample_trade();
        trade.legs = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, name)| TradeLeg {
                commodity: name.to_string(),
                volume: i as f64,
            })
            .collect();

        let xml = engine.serialize(&trade, "trade").unwrap();
        let restored: Trade = engine.deserialize(&xml).unwrap();
        let commodities: Vec<&str> = restored
            .legs
            .iter()
            .map(|leg| leg.commodity.as_str())
            .collect();
        assert_eq!(commodities, vec!["a", "b", "c"]);
    }
}

#[test]
fn test_empty_collection_round_trips() {
    for backend in backends() {
        let engine = engine_with(backend);
        let mut trade = sample_trade();
        trade.legs.clear();

        let xml = engine.serialize(&trade, "trade").unwrap();
        let restored: Trade = engine.deserialize(&xml).unwrap();
        assert!(restored.legs.is_empty());
    }
}

#[test]
fn test_deserialization_tolerates_indented_documents() {
    let pretty = "<point>\n    <x>3</x>\n    <y>4</y>\n</point>\n";
    for backend in backends() {
        let engine = engine_with(backend);
        let point: Point = engine.deserialize(pretty).unwrap();
        assert_eq!(point, Point { x: 3, y: 4 });
    }
}

#[test]
fn test_malformed_document_is_a_navigation_error() {
    for backend in backends() {
        let engine = engine_with(backend);
        let result = engine.deserialize::<Point>("<point><x>3</point>");
        assert!(matches!(result, Err(MappingError::Navigation(_))));
    }
}

#[test]
fn test_deserialize_by_name() {
    for backend in backends() {
        let mut names = TypeRegistry::new();
        names.register::<Point>("Point");
        names.register::<Trade>("Trade");
        let engine = engine_with(backend).with_type_resolver(names);

        let value = engine
            .deserialize_by_name("<point><x>3</x><y>4</y></point>", "Point")
            .unwrap();
        let point = value.downcast::<Point>().unwrap();
        assert_eq!(*point, Point { x: 3, y: 4 });
    }
}

#[test]
fn test_deserialize_by_unknown_name() {
    for backend in backends() {
        let mut names = TypeRegistry::new();
        names.register::<Point>("Point");
        let engine = engine_with(backend).with_type_resolver(names);

        let result = engine.deserialize_by_name("<point/>", "Nope");
        match result {
            Err(MappingError::UnknownTypeName { type_name }) => assert_eq!(type_name, "Nope"),
            _ => panic!("Expected UnknownTypeName"),
        }
    }
}

#[test]
fn test_scalar_collection_round_trip() {
    use xml_mapper::{
        FromXml, MapperRegistry, ReadContext, Result, ToXml, WriteContext, XmlMappingEngine,
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Series {
        values: Vec<i64>,
    }

    #[derive(Clone)]
    struct SeriesMapper;

    impl ToXml<Series> for SeriesMapper {
        fn to_xml(&self, value: &Series, context: &mut WriteContext<'_>) -> Result<()> {
            for v in &value.values {
                context.element("value", v)?;
            }
            Ok(())
        }
    }

    impl FromXml<Series> for SeriesMapper {
        fn from_xml(&self, context: &ReadContext<'_>) -> Result<Series> {
            Ok(Series {
                values: context.scalar_collection("value", "values")?,
            })
        }
    }

    for backend in backends() {
        let mut registry = MapperRegistry::new();
        registry.register::<Series, _>(SeriesMapper);
        let engine = XmlMappingEngine::new(registry, backend);

        let series = Series {
            values: vec![1, 2, 3],
        };
        let xml = engine.serialize(&series, "series").unwrap();
        assert_eq!(
            xml,
            "<series><value>1</value><value>2</value><value>3</value></series>"
        );
        assert_eq!(engine.deserialize::<Series>(&xml).unwrap(), series);
    }
}

#[test]
fn test_mapper_override_for_fixtures() {
    use xml_mapper::{FromXml, ReadContext, Result};

    // A fixture override that defaults y when absent, replacing the strict
    // production mapper — last registration wins.
    #[derive(Clone)]
    struct LenientPointMapper;

    impl FromXml<Point> for LenientPointMapper {
        fn from_xml(&self, context: &ReadContext<'_>) -> Result<Point> {
            Ok(Point {
                x: context.required("x", "x")?,
                y: context.optional("y", "y")?.unwrap_or_default(),
            })
        }
    }

    for backend in backends() {
        let mut registry = build_registry();
        registry.register_from_xml::<Point>(LenientPointMapper);
        let engine = xml_mapper::XmlMappingEngine::new(registry, backend);

        let point: Point = engine.deserialize("<point><x>3</x></point>").unwrap();
        assert_eq!(point, Point { x: 3, y: 0 });
    }
}
