//! Shared fixtures: a small trading domain model with hand-written mapping
//! actions, and engine builders parameterized over both navigation backends.

// Each integration test binary compiles this module; not every binary uses
// every helper.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use xml_mapper::{
    DateRange, DateRangeMapper, FromXml, MapperRegistry, QuickXmlBackend, ReadContext, Result,
    RoxmlBackend, ToXml, WriteContext, XmlBackend, XmlMappingEngine,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone)]
pub struct PointMapper;

impl ToXml<Point> for PointMapper {
    fn to_xml(&self, value: &Point, context: &mut WriteContext<'_>) -> Result<()> {
        context.element("x", &value.x)?;
        context.element("y", &value.y)
    }
}

impl FromXml<Point> for PointMapper {
    fn from_xml(&self, context: &ReadContext<'_>) -> Result<Point> {
        Ok(Point {
            x: context.required("x", "x")?,
            y: context.required("y", "y")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeLeg {
    pub commodity: String,
    pub volume: f64,
}

#[derive(Clone)]
pub struct TradeLegMapper;

impl ToXml<TradeLeg> for TradeLegMapper {
    fn to_xml(&self, value: &TradeLeg, context: &mut WriteContext<'_>) -> Result<()> {
        context.attribute("commodity", &value.commodity)?;
        context.element("volume", &value.volume)
    }
}

impl FromXml<TradeLeg> for TradeLegMapper {
    fn from_xml(&self, context: &ReadContext<'_>) -> Result<TradeLeg> {
        Ok(TradeLeg {
            commodity: context.required("@commodity", "commodity")?,
            volume: context.required("volume", "volume")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub id: String,
    pub counterparty: String,
    pub delivery: DateRange,
    pub legs: Vec<TradeLeg>,
}

#[derive(Clone)]
pub struct TradeMapper;

impl ToXml<Trade> for TradeMapper {
    fn to_xml(&self, value: &Trade, context: &mut WriteContext<'_>) -> Result<()> {
        context.attribute("id", &value.id)?;
        context.element("counterparty", &value.counterparty)?;
        context.nested("delivery", &value.delivery)?;
        context.collection("leg", &value.legs)
    }
}

impl FromXml<Trade> for TradeMapper {
    fn from_xml(&self, context: &ReadContext<'_>) -> Result<Trade> {
        Ok(Trade {
            id: context.required("@id", "id")?,
            counterparty: context.required("counterparty", "counterparty")?,
            delivery: context.nested("delivery", "delivery")?,
            legs: context.collection("leg")?,
        })
    }
}

pub fn build_registry() -> MapperRegistry {
    let mut registry = MapperRegistry::new();
    registry.register::<Point, _>(PointMapper);
    registry.register::<TradeLeg, _>(TradeLegMapper);
    registry.register::<Trade, _>(TradeMapper);
    registry.register::<DateRange, _>(DateRangeMapper::new());
    registry
}

pub fn engine_with(backend: Arc<dyn XmlBackend>) -> XmlMappingEngine {
    XmlMappingEngine::new(build_registry(), backend)
}

pub fn backends() -> Vec<Arc<dyn XmlBackend>> {
    vec![Arc::new(QuickXmlBackend), Arc::new(RoxmlBackend)]
}

pub fn datetime(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn sample_trade() -> Trade {
    Trade {
        id: "T-4711".to_string(),
        counterparty: "Endur".to_string(),
        delivery: DateRange::new(datetime(2011, 1, 1), datetime(2011, 12, 31)),
        legs: vec![
            TradeLeg {
                commodity: "power".to_string(),
                volume: 42.5,
            },
            TradeLeg {
                commodity: "gas".to_string(),
                volume: 17.0,
            },
        ],
    }
}
