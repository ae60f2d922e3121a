use std::path::PathBuf;

use facility_pso::fixtures::data_generator::write_customer_template;
use facility_pso::solver::pso::search;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("template") {
        let path = args
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("customers_template.csv"));
        return write_customer_template(&path);
    }

    search::run()
}
