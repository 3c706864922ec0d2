//! A small fixed catalogue of demonstration formulas selectable by name
//! from the command line.

use anyhow::{bail, Result};
use stql_ast::expr::factory::*;
use stql_ast::{sugar, Expr};

const CAR_CLASS: i64 = 1;

fn car_present() -> Result<Expr> {
    Ok(exists(
        vec![object_var("car")],
        sugar::is_class("car", CAR_CLASS)?,
    )?)
}

fn car_present_and_confident() -> Result<Expr> {
    Ok(exists(
        vec![object_var("car")],
        and(vec![
            sugar::is_class("car", CAR_CLASS)?,
            sugar::high_confidence("car", 0.75)?,
        ])?,
    )?)
}

/// `car was present one tick ago` — past-time, monitorable with history=1.
fn previous_car() -> Result<Expr> {
    previous1(car_present()?).map_err(Into::into)
}

/// `a car will be present next tick` — bounded future, monitorable with horizon=1.
fn next_car() -> Result<Expr> {
    next1(car_present()?).map_err(Into::into)
}

/// Look up a demonstration formula by name. Returns the available names
/// in the error message when `name` doesn't match, so `--formula bogus`
/// fails with something actionable.
pub fn by_name(name: &str) -> Result<Expr> {
    match name {
        "car_present" => car_present(),
        "car_present_and_confident" => car_present_and_confident(),
        "previous_car" => previous_car(),
        "next_car" => next_car(),
        other => bail!(
            "unknown formula '{other}'; available: car_present, car_present_and_confident, previous_car, next_car"
        ),
    }
}
