pub mod carrier_move;
pub mod checkpoint;
pub mod footprint;
pub mod line_item;
pub mod pallet;
pub mod printer;
pub mod shipment;
pub mod sku_mapping;
pub mod task;
pub mod template;

pub use carrier_move::CarrierMoveStopRef;
pub use checkpoint::{now_naive, InputMode, JobCheckpoint, FILE_TARGET_SENTINEL};
pub use footprint::ShipmentSkuFootprint;
pub use line_item::LineItem;
pub use pallet::{LotTracking, Pallet, VIRTUAL_LPN_PREFIX};
pub use printer::{PrinterConfig, RoutingRule, RuleOperator};
pub use shipment::{ShipToAddress, Shipment};
pub use sku_mapping::WalmartSkuMapping;
pub use task::{PrintTask, TaskKind};
pub use template::LabelTemplate;
