//! Shared fixtures: a small CSSE-shaped data set and population table.

#![allow(dead_code)]

use std::sync::Arc;

use epicast::acquisition::{parse_global_csv, parse_population_csv};
use epicast::alignment::AlignmentOptions;
use epicast::snapshot::{build_snapshot, DataSnapshot};
use epicast::PopulationTable;

pub const INFECTED_CSV: &str = "\
Province/State,Country/Region,Lat,Long,3/1/20,3/2/20,3/3/20,3/4/20,3/5/20,3/6/20,3/7/20,3/8/20,3/9/20,3/10/20
,Norway,60.47,8.47,5,12,25,40,60,90,130,180,240,300
,Denmark,56.26,9.50,1,3,8,22,35,50,70,95,120,150
Greenland,Denmark,71.7,-42.6,0,0,0,0,0,1,1,2,2,2
,Sweden,60.13,18.64,30,40,50,60,70,80,90,100,110,120
,Iceland,64.96,-19.02,0,0,1,1,2,2,3,3,3,3
";

pub const DEATHS_CSV: &str = "\
Province/State,Country/Region,Lat,Long,3/1/20,3/2/20,3/3/20,3/4/20,3/5/20,3/6/20,3/7/20,3/8/20,3/9/20,3/10/20
,Norway,60.47,8.47,0,0,0,1,1,2,3,4,6,8
,Denmark,56.26,9.50,0,0,0,0,1,1,2,3,4,5
Greenland,Denmark,71.7,-42.6,0,0,0,0,0,0,0,0,0,0
,Sweden,60.13,18.64,0,0,1,1,2,2,3,3,4,4
,Iceland,64.96,-19.02,0,0,0,0,0,0,0,0,0,0
";

pub const POPULATION_CSV: &str = "\
Country,Population,PopulationDensity,ISO3
Norway,5421241,14.6,NOR
Denmark,5792202,136.5,DNK
Greenland,56770,0.1,GRL
Iceland,341243,3.4,ISL
";

pub fn population() -> Arc<PopulationTable> {
    Arc::new(parse_population_csv(POPULATION_CSV).unwrap())
}

pub fn snapshot() -> DataSnapshot {
    let infected = parse_global_csv(INFECTED_CSV).unwrap();
    let deaths = parse_global_csv(DEATHS_CSV).unwrap();
    build_snapshot(infected, &deaths, population(), AlignmentOptions::default())
}
