use std::sync::Arc;

use chrono::NaiveDate;
use divan::Bencher;
use xml_mapper::{
    DateRange, DateRangeMapper, FromXml, MapperRegistry, QuickXmlBackend, ReadContext, Result,
    RoxmlBackend, ToXml, WriteContext, XmlBackend, XmlMappingEngine,
};

fn main() {
    divan::main();
}

#[derive(Debug, Clone, PartialEq)]
struct Trade {
    id: String,
    counterparty: String,
    delivery: DateRange,
    volumes: Vec<f64>,
}

#[derive(Clone)]
struct TradeMapper;

impl ToXml<Trade> for TradeMapper {
    fn to_xml(&self, value: &Trade, context: &mut WriteContext<'_>) -> Result<()> {
        context.attribute("id", &value.id)?;
        context.element("counterparty", &value.counterparty)?;
        context.nested("delivery", &value.delivery)?;
        for volume in &value.volumes {
            context.element("volume", volume)?;
        }
        Ok(())
    }
}

impl FromXml<Trade> for TradeMapper {
    fn from_xml(&self, context: &ReadContext<'_>) -> Result<Trade> {
        Ok(Trade {
            id: context.required("@id", "id")?,
            counterparty: context.required("counterparty", "counterparty")?,
            delivery: context.nested("delivery", "delivery")?,
            volumes: context.scalar_collection("volume", "volume")?,
        })
    }
}

fn engine(backend: Arc<dyn XmlBackend>) -> XmlMappingEngine {
    let mut registry = MapperRegistry::new();
    registry.register::<Trade, _>(TradeMapper);
    registry.register::<DateRange, _>(DateRangeMapper::new());
    XmlMappingEngine::new(registry, backend)
}

fn sample() -> Trade {
    let start = NaiveDate::from_ymd_opt(2011, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let finish = NaiveDate::from_ymd_opt(2011, 12, 31)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    Trade {
        id: "T-4711".to_string(),
        counterparty: "Endur".to_string(),
        delivery: DateRange::new(start, finish),
        volumes: (0..32).map(|i| i as f64 * 1.5).collect(),
    }
}

#[divan::bench]
fn serialize_quickxml(bencher: Bencher) {
    let engine = engine(Arc::new(QuickXmlBackend));
    let trade = sample();
    bencher.bench_local(move || engine.serialize(&trade, "trade").unwrap());
}

#[divan::bench]
fn serialize_roxml(bencher: Bencher) {
    let engine = engine(Arc::new(RoxmlBackend));
    let trade = sample();
    bencher.bench_local(move || engine.serialize(&trade, "trade").unwrap());
}

#[divan::bench]
fn deserialize_quickxml(bencher: Bencher) {
    let engine = engine(Arc::new(QuickXmlBackend));
    let xml = engine.serialize(&sample(), "trade").unwrap();
    bencher.bench_local(move || engine.deserialize::<Trade>(&xml).unwrap());
}

#[divan::bench]
fn deserialize_roxml(bencher: Bencher) {
    let engine = engine(Arc::new(RoxmlBackend));
    let xml = engine.serialize(&sample(), "trade").unwrap();
    bencher.bench_local(move || engine.deserialize::<Trade>(&xml).unwrap());
}
