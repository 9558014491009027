// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, builder::PossibleValuesParser, command};

use crate::models::DayStatus;
use crate::store::SETTING_KEYS;

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .required(true)
        .help("Pay period as YYYY-MM")
}

fn employee_arg(required: bool) -> Arg {
    Arg::new("employee")
        .long("employee")
        .required(required)
        .help("Employee name")
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

pub fn build_cli() -> Command {
    command!()
        .name("payslip")
        .about("Monthly payroll with cumulative income tax and minimum-wage exemption")
        .subcommand(Command::new("init").about("Create the database and seed default settings"))
        .subcommand(
            Command::new("employee")
                .about("Manage employees")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("salary")
                                .long("salary")
                                .required(true)
                                .help("Gross monthly salary"),
                        )
                        .arg(
                            Arg::new("department")
                                .long("department")
                                .value_parser(clap::value_parser!(i64)),
                        ),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true)))
                .subcommand(
                    Command::new("set-salary")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("salary").long("salary").required(true)),
                )
                .subcommand(
                    Command::new("set-status")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .required(true)
                                .value_parser(PossibleValuesParser::new(["active", "inactive"])),
                        ),
                ),
        )
        .subcommand(
            Command::new("timesheet")
                .about("Record attendance")
                .subcommand(
                    Command::new("set")
                        .arg(employee_arg(true))
                        .arg(month_arg())
                        .arg(
                            Arg::new("day")
                                .long("day")
                                .required(true)
                                .value_parser(clap::value_parser!(u32)),
                        )
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .required(true)
                                .value_parser(PossibleValuesParser::new(
                                    DayStatus::ALL.map(|s| s.as_str()),
                                )),
                        )
                        .arg(
                            Arg::new("hours")
                                .long("hours")
                                .help("Overtime hours (overtime status only)"),
                        )
                        .arg(Arg::new("weekend").long("weekend").action(ArgAction::SetTrue))
                        .arg(Arg::new("holiday").long("holiday").action(ArgAction::SetTrue)),
                )
                .subcommand(
                    Command::new("clear")
                        .arg(employee_arg(true))
                        .arg(month_arg())
                        .arg(
                            Arg::new("day")
                                .long("day")
                                .required(true)
                                .value_parser(clap::value_parser!(u32)),
                        ),
                )
                .subcommand(
                    Command::new("show")
                        .arg(employee_arg(true))
                        .arg(month_arg())
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Rates, minimum wage, multipliers and tax brackets")
                .subcommand(Command::new("show").args(json_args()))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("key")
                                .long("key")
                                .required(true)
                                .value_parser(PossibleValuesParser::new(SETTING_KEYS)),
                        )
                        .arg(Arg::new("value").long("value").required(true)),
                )
                .subcommand(
                    Command::new("brackets").arg(
                        Arg::new("file")
                            .long("file")
                            .required(true)
                            .help("JSON array of {limit, rate}; last limit must be null"),
                    ),
                ),
        )
        .subcommand(
            Command::new("payroll")
                .about("Compute, approve and inspect payrolls")
                .subcommand(
                    Command::new("generate")
                        .arg(month_arg())
                        .arg(employee_arg(false).help("Only this employee (default: all active)")),
                )
                .subcommand(Command::new("list").arg(month_arg()).args(json_args()))
                .subcommand(
                    Command::new("show")
                        .arg(employee_arg(true))
                        .arg(month_arg())
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("approve")
                        .arg(employee_arg(true))
                        .arg(month_arg())
                        .arg(Arg::new("by").long("by").required(true).help("Approving user")),
                )
                .subcommand(
                    Command::new("unapprove")
                        .arg(employee_arg(true))
                        .arg(month_arg()),
                )
                .subcommand(Command::new("rm").arg(employee_arg(true)).arg(month_arg())),
        )
        .subcommand(
            Command::new("report")
                .about("Payroll totals")
                .subcommand(Command::new("monthly").arg(month_arg()).args(json_args())),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("payrolls")
                    .arg(month_arg())
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .value_parser(PossibleValuesParser::new(["csv", "json"])),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("doctor").about("Check settings, timesheets and payroll freshness"),
        )
}
