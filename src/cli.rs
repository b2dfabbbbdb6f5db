// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON value per line"),
    )
}

fn branch_arg() -> Arg {
    Arg::new("branch")
        .long("branch")
        .short('b')
        .help("Branch id (defaults to the branch selected with `branch use`)")
}

fn as_of_arg() -> Arg {
    Arg::new("as-of")
        .long("as-of")
        .help("Evaluate rolling windows as of YYYY-MM-DD instead of today")
}

fn period_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("period")
            .long("period")
            .short('p')
            .default_value("6months")
            .help("3months | 6months | 1year | custom | all | YYYY-MM"),
    )
    .arg(Arg::new("from").long("from").help("Custom period start (YYYY-MM-DD)"))
    .arg(Arg::new("to").long("to").help("Custom period end (YYYY-MM-DD)"))
    .arg(as_of_arg())
}

pub fn build_cli() -> Command {
    Command::new("branchflow")
        .version(crate_version!())
        .about("Multi-branch cash-flow tracking and business analytics")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("user")
                .about("Manage users")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(
                    json_args(Command::new("show").arg(Arg::new("email").long("email").required(true))),
                ),
        )
        .subcommand(
            Command::new("branch")
                .about("Manage branches")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("display-name").long("display-name"))
                        .arg(Arg::new("currency").long("currency").default_value("PHP"))
                        .arg(
                            Arg::new("fiscal-year-start")
                                .long("fiscal-year-start")
                                .value_parser(value_parser!(u32))
                                .default_value("1"),
                        )
                        .arg(Arg::new("created-by").long("created-by").help("Creator email")),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("use").arg(Arg::new("id").required(true)))
                .subcommand(Command::new("current")),
        )
        .subcommand(
            Command::new("tx")
                .about("Record, list and delete transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("source").long("source"))
                        .arg(
                            Arg::new("personal")
                                .long("personal")
                                .action(ArgAction::SetTrue)
                                .help("Mark the expense as a personal draw"),
                        )
                        .arg(
                            Arg::new("daily")
                                .long("daily")
                                .action(ArgAction::SetTrue)
                                .help("Record as part of a daily upload"),
                        )
                        .arg(Arg::new("user-email").long("user-email"))
                        .arg(branch_arg()),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(branch_arg())
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("from").long("from"))
                        .arg(Arg::new("to").long("to"))
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .short('s')
                                .help("Case-insensitive regex over description, source and category"),
                        )
                        .arg(Arg::new("personal").long("personal").action(ArgAction::SetTrue))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import transactions from CSV")
                .subcommand(
                    Command::new("transactions")
                        .arg(Arg::new("path").long("path").required(true))
                        .arg(Arg::new("user-email").long("user-email"))
                        .arg(branch_arg()),
                )
                .subcommand(
                    Command::new("ledger")
                        .about("Import the wide daily-ledger sheet (income, expense and personal columns)")
                        .arg(Arg::new("path").long("path").required(true))
                        .arg(Arg::new("user-email").long("user-email"))
                        .arg(branch_arg()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export transactions or analytics")
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv | json"),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(branch_arg()),
                )
                .subcommand(period_args(
                    Command::new("analytics")
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(branch_arg()),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Dashboards and analytics")
                .subcommand(json_args(period_args(
                    Command::new("analytics").arg(branch_arg()),
                )))
                .subcommand(json_args(
                    Command::new("monthly")
                        .about("Compare two months side by side")
                        .arg(Arg::new("month").long("month").required(true))
                        .arg(Arg::new("against").long("against").required(true))
                        .arg(branch_arg()),
                ))
                .subcommand(json_args(
                    Command::new("yearly")
                        .about("Year-to-year comparison")
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .required(true)
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(
                            Arg::new("against")
                                .long("against")
                                .required(true)
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(branch_arg()),
                ))
                .subcommand(json_args(
                    Command::new("personal")
                        .about("Personal draws for one month")
                        .arg(Arg::new("month").long("month").required(true))
                        .arg(branch_arg()),
                ))
                .subcommand(json_args(
                    Command::new("dashboard")
                        .about("This month vs last month and this year vs last year")
                        .arg(as_of_arg())
                        .arg(branch_arg()),
                )),
        )
}
